//! [`Transport`] over an x11rb connection.

use std::cell::Cell;

use x11rb::{
    COPY_DEPTH_FROM_PARENT, COPY_FROM_PARENT,
    connection::Connection,
    protocol::{
        Event,
        xproto::{
            Atom, AtomEnum, ChangeWindowAttributesAux, ClientMessageData, ClientMessageEvent,
            ConnectionExt as _, CreateWindowAux, EventMask, PropMode, Timestamp, Window,
            WindowClass, CLIENT_MESSAGE_EVENT,
        },
    },
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
};

use crate::{
    ClientError, Result,
    atoms::Atoms,
    transport::{RawProperty, Transport},
};

const HOST_NAME_MAX: usize = 256;

pub struct X11Transport<C: Connection> {
    conn: C,
    root: Window,
    atoms: Atoms,
    time: Cell<Timestamp>,
}

impl X11Transport<RustConnection> {
    /// Connects to `display` (or `$DISPLAY`) and interns the atom table.
    pub fn connect(display: Option<&str>) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(display)?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| ClientError::Transport(format!("no screen {screen_num}")))?;
        Self::new(conn, root)
    }
}

impl<C: Connection> X11Transport<C> {
    pub fn new(conn: C, root: Window) -> Result<Self> {
        let atoms = {
            // Send every request before waiting on the first reply.
            let cookies = Atoms::NAMES
                .iter()
                .map(|name| conn.intern_atom(false, name.as_bytes()))
                .collect::<Result<Vec<_>, _>>()?;
            let mut cookies = cookies.into_iter();
            Atoms::from_fn(|name| {
                let cookie = cookies
                    .next()
                    .ok_or_else(|| ClientError::Transport(format!("no reply for atom {name}")))?;
                Ok::<_, ClientError>(cookie.reply()?.atom)
            })?
        };
        tracing::debug!(root, count = Atoms::NAMES.len(), "atoms interned");

        Ok(Self {
            conn,
            root,
            atoms,
            time: Cell::new(x11rb::CURRENT_TIME),
        })
    }

    pub fn conn(&self) -> &C {
        &self.conn
    }

    pub fn root(&self) -> Window {
        self.root
    }

    /// Records the timestamp of the event being handled.
    pub fn set_event_time(&self, time: Timestamp) {
        if time != x11rb::CURRENT_TIME {
            self.time.set(time);
        }
    }

    /// Obtains a server timestamp from the PropertyNotify that a zero-length
    /// append on a private unmapped window generates. Must run before any
    /// other events are selected; everything else read meanwhile is dropped.
    pub fn sync_server_time(&self) -> Result<Timestamp> {
        let probe = self.conn.generate_id()?;
        self.conn.create_window(
            COPY_DEPTH_FROM_PARENT,
            probe,
            self.root,
            -1,
            -1,
            1,
            1,
            0,
            WindowClass::INPUT_ONLY,
            COPY_FROM_PARENT,
            &CreateWindowAux::new().event_mask(EventMask::PROPERTY_CHANGE),
        )?;
        self.conn.change_property8(
            PropMode::APPEND,
            probe,
            self.atoms.WM_NAME,
            self.atoms.STRING,
            &[],
        )?;
        self.conn.flush()?;

        let time = loop {
            match self.conn.wait_for_event()? {
                Event::PropertyNotify(ev) if ev.window == probe => break ev.time,
                Event::Error(err) => {
                    return Err(ClientError::Transport(format!(
                        "timestamp request failed: {err:?}"
                    )));
                }
                _ => {}
            }
        };
        self.conn.destroy_window(probe)?;
        self.conn.flush()?;

        self.set_event_time(time);
        tracing::debug!(time, "server time synchronized");
        Ok(time)
    }

    /// Subscribes to property changes on `window`, and to client messages
    /// sent to the root window on its behalf.
    pub fn watch_window(&self, window: Window) -> Result<()> {
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new()
                .event_mask(EventMask::PROPERTY_CHANGE | EventMask::STRUCTURE_NOTIFY),
        )?;
        self.conn.change_window_attributes(
            self.root,
            &ChangeWindowAttributesAux::new().event_mask(EventMask::SUBSTRUCTURE_NOTIFY),
        )?;
        self.flush()
    }

    pub fn flush(&self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }
}

impl<C: Connection> Transport for X11Transport<C> {
    fn atoms(&self) -> &Atoms {
        &self.atoms
    }

    fn list_properties(&self, window: Window) -> Result<Vec<Atom>> {
        Ok(self.conn.list_properties(window)?.reply()?.atoms)
    }

    fn get_property(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        long_length: u32,
    ) -> Result<Option<RawProperty>> {
        let reply = self
            .conn
            .get_property(false, window, property, type_, 0, long_length)?
            .reply()?;
        if reply.type_ == u32::from(AtomEnum::NONE) {
            return Ok(None);
        }
        Ok(Some(RawProperty {
            type_: reply.type_,
            format: reply.format,
            value: reply.value,
        }))
    }

    fn change_property32(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> Result<()> {
        self.conn
            .change_property32(PropMode::REPLACE, window, property, type_, data)?;
        Ok(())
    }

    fn change_property8(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u8],
    ) -> Result<()> {
        self.conn
            .change_property8(PropMode::REPLACE, window, property, type_, data)?;
        Ok(())
    }

    fn delete_property(&self, window: Window, property: Atom) -> Result<()> {
        self.conn.delete_property(window, property)?;
        Ok(())
    }

    fn send_client_message(
        &self,
        window: Window,
        message_type: Atom,
        data: [u32; 5],
    ) -> Result<()> {
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window,
            type_: message_type,
            data: ClientMessageData::from(data),
        };
        self.conn
            .send_event(false, window, EventMask::NO_EVENT, event)?;
        self.conn.flush()?;
        Ok(())
    }

    fn local_hostname(&self) -> Result<String> {
        let mut buf = [0u8; HOST_NAME_MAX];
        // SAFETY: the buffer is valid for `buf.len()` bytes for the duration of the call.
        let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
        if rc != 0 {
            return Err(ClientError::Process(format!(
                "gethostname failed: {}",
                std::io::Error::last_os_error()
            )));
        }
        let end = buf.iter().position(|byte| *byte == 0).unwrap_or(buf.len());
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }

    fn event_time(&self) -> Timestamp {
        self.time.get()
    }
}
