use std::time::Duration;

use x11rb::protocol::xproto::{Atom, Timestamp, Window};

use crate::{Result, atoms::Atoms};

/// A property value as returned by the display server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawProperty {
    pub type_: Atom,
    pub format: u8,
    pub value: Vec<u8>,
}

impl RawProperty {
    pub fn from_u32(type_: Atom, data: &[u32]) -> Self {
        Self {
            type_,
            format: 32,
            value: data.iter().flat_map(|word| word.to_ne_bytes()).collect(),
        }
    }

    pub fn from_bytes(type_: Atom, data: &[u8]) -> Self {
        Self {
            type_,
            format: 8,
            value: data.to_vec(),
        }
    }

    pub fn value32(&self) -> Option<impl Iterator<Item = u32> + '_> {
        (self.format == 32).then(|| {
            self.value
                .chunks_exact(4)
                .map(|chunk| u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        })
    }

    /// Number of elements of the property's own format.
    pub fn len(&self) -> usize {
        match self.format {
            32 => self.value.len() / 4,
            16 => self.value.len() / 2,
            _ => self.value.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Display-side operations the adapter needs. Implemented over x11rb in
/// [`crate::x11::X11Transport`].
pub trait Transport {
    fn atoms(&self) -> &Atoms;

    fn list_properties(&self, window: Window) -> Result<Vec<Atom>>;

    /// `type_` of 0 matches any type. `long_length` is in 32-bit units.
    fn get_property(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        long_length: u32,
    ) -> Result<Option<RawProperty>>;

    fn change_property32(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> Result<()>;

    fn change_property8(&self, window: Window, property: Atom, type_: Atom, data: &[u8])
    -> Result<()>;

    fn delete_property(&self, window: Window, property: Atom) -> Result<()>;

    fn send_client_message(&self, window: Window, message_type: Atom, data: [u32; 5])
    -> Result<()>;

    /// Reads a text property and decodes it according to its encoding type.
    fn text_property(&self, window: Window, property: Atom) -> Result<Option<String>> {
        let prop = self.get_property(window, property, 0, 1 << 16)?;
        Ok(prop.and_then(|prop| decode_text(self.atoms(), &prop)))
    }

    fn local_hostname(&self) -> Result<String>;

    /// Timestamp of the event currently being processed.
    fn event_time(&self) -> Timestamp;
}

/// Single-shot timer used for liveness probes. Expiry is delivered back to the
/// adapter as a timeout event by whoever owns the event loop.
pub trait ProbeTimer {
    fn arm(&mut self, window: Window, delay: Duration) -> Result<()>;
    fn cancel(&mut self, window: Window);
}

pub fn decode_text(atoms: &Atoms, prop: &RawProperty) -> Option<String> {
    if prop.format != 8 {
        return None;
    }
    let bytes = match prop.value.iter().position(|byte| *byte == 0) {
        Some(end) => &prop.value[..end],
        None => &prop.value[..],
    };
    if prop.type_ == atoms.STRING {
        // ISO 8859-1 maps byte-for-byte onto the first 256 code points.
        Some(bytes.iter().map(|byte| char::from(*byte)).collect())
    } else if prop.type_ == atoms.COMPOUND_TEXT {
        Some(decode_compound_text(bytes))
    } else {
        Some(String::from_utf8_lossy(bytes).into_owned())
    }
}

const ESC: u8 = 0x1b;
const CSI: u8 = 0x9b;

/// Decodes the subset of Compound Text that Xlib produces for titles: the
/// initial ASCII/Latin-1 state, `ESC % G` .. `ESC % @` UTF-8 segments, and
/// re-designation back to Latin-1. Text in any other designated charset is
/// replaced with U+FFFD. Direction (CSI) sequences are dropped.
fn decode_compound_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let (mut gl_ascii, mut gr_latin1) = (true, true);
    let mut rest = bytes;

    while let Some((&byte, tail)) = rest.split_first() {
        match byte {
            ESC => {
                if let [b'%', b'G', body @ ..] = tail {
                    let end = body
                        .windows(3)
                        .position(|seq| seq == [ESC, b'%', b'@'])
                        .unwrap_or(body.len());
                    out.push_str(&String::from_utf8_lossy(&body[..end]));
                    rest = body.get(end + 3..).unwrap_or_default();
                    continue;
                }

                let len = tail
                    .iter()
                    .take_while(|b| (0x20..=0x2f).contains(*b))
                    .count();
                let Some(&final_byte) = tail.get(len) else {
                    break;
                };
                match &tail[..len] {
                    [b'('] => gl_ascii = final_byte == b'B',
                    [b'$', b'('] | [b'$'] => gl_ascii = false,
                    [b'-'] => gr_latin1 = final_byte == b'A',
                    [b')'] | [b'$', b')'] | [b'$', b'-'] => gr_latin1 = false,
                    _ => {}
                }
                rest = &tail[len + 1..];
            }
            CSI => {
                let len = tail
                    .iter()
                    .take_while(|b| (0x20..=0x3f).contains(*b))
                    .count();
                rest = tail.get(len + 1..).unwrap_or_default();
            }
            0x00..=0x7f if gl_ascii || byte < 0x21 => {
                out.push(char::from(byte));
                rest = tail;
            }
            0xa0..=0xff if gr_latin1 => {
                out.push(char::from(byte));
                rest = tail;
            }
            _ => {
                out.push(char::REPLACEMENT_CHARACTER);
                rest = tail;
            }
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod fake {
    use std::{
        cell::{Cell, RefCell},
        collections::HashMap,
        time::Duration,
    };

    use super::*;

    pub struct FakeTransport {
        pub atoms: Atoms,
        pub hostname: String,
        pub time: Cell<Timestamp>,
        pub properties: RefCell<HashMap<(Window, Atom), RawProperty>>,
        pub sent: RefCell<Vec<(Window, Atom, [u32; 5])>>,
        pub deleted: RefCell<Vec<(Window, Atom)>>,
        pub writes: Cell<usize>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self {
                atoms: Atoms::sequential(),
                hostname: "workstation".to_owned(),
                time: Cell::new(1000),
                properties: RefCell::new(HashMap::new()),
                sent: RefCell::new(Vec::new()),
                deleted: RefCell::new(Vec::new()),
                writes: Cell::new(0),
            }
        }

        pub fn set32(&self, window: Window, property: Atom, type_: Atom, data: &[u32]) {
            self.properties
                .borrow_mut()
                .insert((window, property), RawProperty::from_u32(type_, data));
        }

        pub fn set_text(&self, window: Window, property: Atom, text: &str) {
            let type_ = self.atoms.UTF8_STRING;
            self.properties
                .borrow_mut()
                .insert((window, property), RawProperty::from_bytes(type_, text.as_bytes()));
        }

        pub fn remove(&self, window: Window, property: Atom) {
            self.properties.borrow_mut().remove(&(window, property));
        }

        pub fn get32(&self, window: Window, property: Atom) -> Option<Vec<u32>> {
            self.properties
                .borrow()
                .get(&(window, property))
                .and_then(|prop| prop.value32().map(|words| words.collect()))
        }

        pub fn has(&self, window: Window, property: Atom) -> bool {
            self.properties.borrow().contains_key(&(window, property))
        }
    }

    impl Transport for FakeTransport {
        fn atoms(&self) -> &Atoms {
            &self.atoms
        }

        fn list_properties(&self, window: Window) -> Result<Vec<Atom>> {
            Ok(self
                .properties
                .borrow()
                .keys()
                .filter(|(owner, _)| *owner == window)
                .map(|(_, atom)| *atom)
                .collect())
        }

        fn get_property(
            &self,
            window: Window,
            property: Atom,
            type_: Atom,
            long_length: u32,
        ) -> Result<Option<RawProperty>> {
            let props = self.properties.borrow();
            let Some(prop) = props.get(&(window, property)) else {
                return Ok(None);
            };
            if type_ != 0 && prop.type_ != type_ {
                // The server reports the actual type with no data.
                return Ok(Some(RawProperty {
                    type_: prop.type_,
                    format: prop.format,
                    value: Vec::new(),
                }));
            }
            let mut prop = prop.clone();
            prop.value.truncate(long_length as usize * 4);
            Ok(Some(prop))
        }

        fn change_property32(
            &self,
            window: Window,
            property: Atom,
            type_: Atom,
            data: &[u32],
        ) -> Result<()> {
            self.writes.set(self.writes.get() + 1);
            self.set32(window, property, type_, data);
            Ok(())
        }

        fn change_property8(
            &self,
            window: Window,
            property: Atom,
            type_: Atom,
            data: &[u8],
        ) -> Result<()> {
            self.writes.set(self.writes.get() + 1);
            self.properties
                .borrow_mut()
                .insert((window, property), RawProperty::from_bytes(type_, data));
            Ok(())
        }

        fn delete_property(&self, window: Window, property: Atom) -> Result<()> {
            self.deleted.borrow_mut().push((window, property));
            self.remove(window, property);
            Ok(())
        }

        fn send_client_message(
            &self,
            window: Window,
            message_type: Atom,
            data: [u32; 5],
        ) -> Result<()> {
            self.sent.borrow_mut().push((window, message_type, data));
            Ok(())
        }

        fn local_hostname(&self) -> Result<String> {
            Ok(self.hostname.clone())
        }

        fn event_time(&self) -> Timestamp {
            self.time.get()
        }
    }

    #[derive(Default)]
    pub struct FakeTimer {
        pub armed: Vec<(Window, Duration)>,
        pub cancelled: Vec<Window>,
    }

    impl ProbeTimer for FakeTimer {
        fn arm(&mut self, window: Window, delay: Duration) -> Result<()> {
            self.armed.push((window, delay));
            Ok(())
        }

        fn cancel(&mut self, window: Window) {
            self.cancelled.push(window);
        }
    }
}
