use std::{
    backtrace::Backtrace,
    fs,
    os::fd::AsFd,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, bail};
use calloop::{
    EventLoop, Interest, LoopHandle, LoopSignal, Mode, PostAction, RegistrationToken,
    generic::Generic,
    signals::{Signal, Signals},
    timer::{TimeoutAction, Timer},
};
use frame_client::{
    ClientError, Result,
    client::{ClientIcon, FrameClient},
    config::{self, RuntimeConfig},
    dispatch::{ClientEvent, Dispatch, Dispatcher},
    ewmh::WindowState,
    frame::{FrameControl, SimulatedFrame},
    liveness::{Escalation, KillSignal, ProcessControl, SignalSender},
    transport::{ProbeTimer, Transport},
    x11::X11Transport,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use x11rb::{
    connection::Connection,
    protocol::{Event, xproto::Property, xproto::Window},
    rust_connection::RustConnection,
};

const USAGE: &str = "usage: frame-client [--config <path>] [--display <name>] \
                     <inspect <window> | ping <window> [--kill] | watch <window> [--apply]>";

fn main() -> anyhow::Result<()> {
    init_backtrace_defaults();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;
    let loaded = config::load(args.config.as_deref()).context("failed to load config")?;
    init_logging(loaded.config.log_filter.as_deref())?;
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = Backtrace::force_capture();
        tracing::error!("panic: {panic_info}\n{backtrace}");
        eprintln!("panic: {panic_info}\n{backtrace}");
    }));
    match &loaded.path {
        Some(path) => tracing::info!(path = %path.display(), "config loaded"),
        None => tracing::info!("no config file; using defaults"),
    }

    let transport =
        X11Transport::connect(args.display.as_deref()).context("failed to open X display")?;

    match args.command {
        Command::Inspect => inspect(&transport, args.window, &loaded.config)?,
        Command::Ping { .. } | Command::Watch { .. } => {
            run_session(transport, args.window, args.command, &loaded.config)?
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Inspect,
    Ping { kill: bool },
    Watch { apply: bool },
}

struct Args {
    command: Command,
    window: Window,
    config: Option<PathBuf>,
    display: Option<String>,
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut config = None;
    let mut display = None;
    let mut positional = Vec::new();
    let mut kill = false;
    let mut apply = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(iter.next().context(USAGE)?)),
            "--display" => display = Some(iter.next().context(USAGE)?.clone()),
            "--kill" => kill = true,
            "--apply" => apply = true,
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
            _ => positional.push(arg.as_str()),
        }
    }

    let [name, window] = positional[..] else {
        bail!(USAGE);
    };
    let command = match name {
        "inspect" => Command::Inspect,
        "ping" => Command::Ping { kill },
        "watch" => Command::Watch { apply },
        other => bail!("unknown command {other}\n{USAGE}"),
    };
    if (kill && !matches!(command, Command::Ping { .. }))
        || (apply && !matches!(command, Command::Watch { .. }))
    {
        bail!(USAGE);
    }

    Ok(Args {
        command,
        window: parse_window(window)?,
        config,
        display,
    })
}

fn parse_window(raw: &str) -> anyhow::Result<Window> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => Window::from_str_radix(hex, 16),
        None => raw.parse::<Window>(),
    };
    parsed.with_context(|| format!("invalid window id {raw}"))
}

fn inspect(
    transport: &X11Transport<RustConnection>,
    window: Window,
    config: &RuntimeConfig,
) -> Result<()> {
    let mut client = FrameClient::adopt(transport, window, config.client_settings())?;
    let atoms = *transport.atoms();

    println!("window {window:#x}");
    let present: Vec<String> = client
        .cache()
        .present()
        .iter()
        .map(|kind| format!("{kind:?}"))
        .collect();
    println!("  present: {}", present.join(" "));
    println!("  title: {:?}", client.window_title());
    println!("  icon title: {:?}", client.icon_title());
    println!("  class: {:?}", client.class_hint().resource());
    println!("  protocols: {:?}", client.protocols());
    println!("  transient for: {:?}", client.transient_for());
    println!("  client leader: {:?}", client.client_leader());
    println!("  role: {:?}", client.identity().role);
    println!("  sm client id: {:?}", client.sm_client_id(transport));
    println!("  pid: {:?}", client.pid(transport));

    let hints = client.size_hints();
    println!(
        "  size hints: min {}x{} max {}x{} inc {}x{} base {}x{} gravity {:?}",
        hints.min.w,
        hints.min.h,
        hints.max.w,
        hints.max.h,
        hints.increment.w,
        hints.increment.h,
        hints.base.w,
        hints.base.h,
        hints.gravity,
    );
    if let Some(aspect) = hints.aspect {
        println!("  aspect: {:?} .. {:?}", aspect.min, aspect.max);
    }
    println!("  functions: {:?}", client.functions());
    println!("  decorations: {:?}", client.decorations());

    println!("  frame state: {:?}", client.frame_state(transport));
    let state = client.net_wm_state(transport, false);
    let names: Vec<&str> = state
        .to_atoms(&atoms)
        .into_iter()
        .filter_map(|atom| atoms.name_of(atom))
        .collect();
    println!("  net state: {state:?} [{}]", names.join(" "));
    println!("  window type: {:?}", client.window_type(transport));
    println!("  desktop: {:?}", client.desktop(transport));
    println!("  layer: {:?}", client.layer(transport));
    println!("  tray: {:?}", client.tray_option(transport));
    println!("  strut: {:?}", client.effective_strut(transport));
    println!("  user time: {:?}", client.user_time(transport));
    println!("  startup time: {:?}", client.startup_time(transport));
    println!("  opacity: {:?}", client.opacity(transport));
    let icon = client.icon(transport).map(|icon| match icon {
        ClientIcon::NetWm(data) => format!("_NET_WM_ICON ({} words)", data.len()),
        ClientIcon::WinIcons { data, .. } => format!("_WIN_ICONS ({} words)", data.len()),
        ClientIcon::Kwm { pixmap, .. } => format!("KWM_WIN_ICON pixmap {pixmap:#x}"),
        ClientIcon::WmHints { pixmap, .. } => format!("WM_HINTS pixmap {pixmap:#x}"),
    });
    println!("  icon: {icon:?}");
    Ok(())
}

/// Probe timer backed by a calloop timer source.
struct LoopTimer {
    handle: LoopHandle<'static, Session>,
    token: Option<RegistrationToken>,
}

impl ProbeTimer for LoopTimer {
    fn arm(&mut self, window: Window, delay: Duration) -> Result<()> {
        self.cancel(window);
        let token = self
            .handle
            .insert_source(Timer::from_duration(delay), |_, _, session| {
                session.ping_timed_out();
                TimeoutAction::Drop
            })
            .map_err(|err| ClientError::EventLoop(format!("failed to arm ping timer: {err}")))?;
        self.token = Some(token);
        Ok(())
    }

    fn cancel(&mut self, _window: Window) {
        if let Some(token) = self.token.take() {
            self.handle.remove(token);
        }
    }
}

/// Stands in for `kill(2)` when escalation was not asked for.
struct ReportOnly;

impl ProcessControl for ReportOnly {
    fn terminate(&mut self, pid: u32) -> Result<()> {
        println!("would signal pid {pid} (pass --kill to send it)");
        Ok(())
    }
}

struct Session {
    transport: X11Transport<RustConnection>,
    client: FrameClient,
    frame: Option<SimulatedFrame>,
    timer: LoopTimer,
    command: Command,
    kill_signal: KillSignal,
    signal: LoopSignal,
    started: Instant,
}

impl Session {
    fn drain_events(&mut self) -> Result<()> {
        while let Some(event) = self.transport.conn().poll_for_event()? {
            self.handle_event(event);
        }
        self.transport.flush()
    }

    fn handle_event(&mut self, event: Event) {
        let window = self.client.window();
        let atoms = *self.transport.atoms();
        let client_event = match event {
            Event::PropertyNotify(ev) if ev.window == window => {
                self.transport.set_event_time(ev.time);
                ClientEvent::PropertyChanged {
                    atom: ev.atom,
                    deleted: ev.state == Property::DELETE,
                }
            }
            Event::ClientMessage(ev) => {
                let data = ev.data.as_data32();
                let ping_reply = ev.window == self.transport.root()
                    && ev.type_ == atoms.WM_PROTOCOLS
                    && data[2] == window;
                if ev.window != window && !ping_reply {
                    return;
                }
                ClientEvent::Message {
                    message_type: ev.type_,
                    format: ev.format,
                    data,
                }
            }
            Event::DestroyNotify(ev) if ev.window == window => {
                tracing::info!(window, "window destroyed");
                println!("{window:#x} destroyed");
                self.signal.stop();
                return;
            }
            Event::Error(err) => {
                tracing::warn!("X11 error: {err:?}");
                return;
            }
            _ => return,
        };

        let outcome = Dispatcher {
            transport: &self.transport,
            client: &mut self.client,
            frame: self
                .frame
                .as_mut()
                .map(|frame| frame as &mut dyn FrameControl),
            timer: &mut self.timer,
        }
        .dispatch(client_event);
        self.report(client_event, outcome);
    }

    fn report(&mut self, event: ClientEvent, outcome: Dispatch) {
        let window = self.client.window();
        match self.command {
            Command::Ping { .. } => {
                if matches!(event, ClientEvent::Message { .. }) && !self.client.liveness().is_pending()
                {
                    println!(
                        "{window:#x} answered ping in {} ms",
                        self.started.elapsed().as_millis()
                    );
                    self.signal.stop();
                }
            }
            Command::Watch { apply } => {
                let atoms = self.transport.atoms();
                match event {
                    ClientEvent::PropertyChanged { atom, deleted } => println!(
                        "property {} {} -> {outcome:?}",
                        atoms.name_of(atom).unwrap_or("(untracked)"),
                        if deleted { "deleted" } else { "changed" },
                    ),
                    ClientEvent::Message { message_type, .. } => println!(
                        "message {} -> {outcome:?}",
                        atoms.name_of(message_type).unwrap_or("(unknown)"),
                    ),
                }
                let Some(frame) = self.frame.as_mut() else {
                    return;
                };
                for notification in frame.notifications.drain(..) {
                    println!("  notify {notification:?}");
                }
                if apply {
                    match self.client.write_net_wm_state(&self.transport, frame.state) {
                        Ok(true) => println!("  wrote _NET_WM_STATE {:?}", frame.state),
                        Ok(false) => {}
                        Err(err) => tracing::warn!(window, "failed to write state: {err}"),
                    }
                }
            }
            Command::Inspect => {}
        }
    }

    fn ping_timed_out(&mut self) {
        self.timer.token = None;
        let escalation = match self.command {
            Command::Ping { kill: true } => self.client.ping_timed_out(
                &self.transport,
                &mut SignalSender {
                    signal: self.kill_signal,
                },
            ),
            _ => self.client.ping_timed_out(&self.transport, &mut ReportOnly),
        };
        let window = self.client.window();
        match escalation {
            Escalation::Stale => return,
            Escalation::Signalled { window: owner, pid } if owner == window => {
                println!("{window:#x} did not answer; process {pid} targeted")
            }
            Escalation::Signalled { window: owner, pid } => {
                println!("{window:#x} did not answer; owner {owner:#x} process {pid} targeted")
            }
            Escalation::Unresolved => {
                println!("{window:#x} did not answer; no local process found")
            }
        }
        self.signal.stop();
    }
}

fn run_session(
    transport: X11Transport<RustConnection>,
    window: Window,
    command: Command,
    config: &RuntimeConfig,
) -> Result<()> {
    let mut event_loop: EventLoop<'static, Session> =
        EventLoop::try_new().map_err(|e| ClientError::EventLoop(e.to_string()))?;
    let handle = event_loop.handle();

    transport.sync_server_time()?;
    let client = FrameClient::adopt(&transport, window, config.client_settings())?;
    let frame = match command {
        Command::Watch { .. } => {
            let mut frame = SimulatedFrame::with_state(client.net_wm_state(&transport, true));
            if let Some(layer) = client.layer(&transport) {
                frame.layer = layer;
            }
            Some(frame)
        }
        _ => None,
    };
    transport.watch_window(window)?;

    let fd = transport
        .conn()
        .stream()
        .as_fd()
        .try_clone_to_owned()
        .map_err(|err| ClientError::EventLoop(format!("failed to duplicate X11 fd: {err}")))?;
    handle
        .insert_source(
            Generic::new(fd, Interest::READ, Mode::Level),
            |_, _, session: &mut Session| {
                if let Err(err) = session.drain_events() {
                    tracing::error!("lost X11 connection: {err}");
                    session.signal.stop();
                }
                Ok(PostAction::Continue)
            },
        )
        .map_err(|err| ClientError::EventLoop(format!("failed to watch X11 fd: {err}")))?;

    let signals = Signals::new(&[Signal::SIGINT, Signal::SIGTERM])
        .map_err(|err| ClientError::EventLoop(format!("failed to install signal source: {err}")))?;
    handle
        .insert_source(signals, |event, _, session| {
            tracing::info!(signal = ?event.signal(), "stopping");
            session.signal.stop();
        })
        .map_err(|err| ClientError::EventLoop(format!("failed to watch signals: {err}")))?;

    let mut session = Session {
        transport,
        client,
        frame,
        timer: LoopTimer {
            handle: handle.clone(),
            token: None,
        },
        command,
        kill_signal: config.kill_signal,
        signal: event_loop.get_signal(),
        started: Instant::now(),
    };

    match command {
        Command::Ping { .. } => {
            let sent = session.client.send_ping(&session.transport, &mut session.timer)?;
            if !sent {
                println!("{window:#x} was not pinged (no _NET_WM_PING support)");
                return Ok(());
            }
            tracing::info!(window, timeout = ?config.ping_timeout, "ping sent");
        }
        Command::Watch { apply } => {
            tracing::info!(window, apply, "watching window");
            println!(
                "watching {window:#x} (state {:?})",
                session
                    .frame
                    .as_ref()
                    .map(|frame| frame.state)
                    .unwrap_or_else(WindowState::empty)
            );
        }
        Command::Inspect => return Ok(()),
    }

    session.drain_events()?;
    event_loop
        .run(None, &mut session, |session| {
            // x11rb may have queued events while reading replies.
            if let Err(err) = session.drain_events() {
                tracing::warn!("failed to process X11 events: {err}");
            }
        })
        .map_err(|e| ClientError::EventLoop(e.to_string()))?;

    Ok(())
}

fn init_backtrace_defaults() {
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // Safety: called at startup before creating any threads.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    if std::env::var_os("RUST_LIB_BACKTRACE").is_none() {
        // Safety: called at startup before creating any threads.
        unsafe { std::env::set_var("RUST_LIB_BACKTRACE", "0") };
    }
}

const DEFAULT_LOG_FILTER: &str = concat!(
    "frame_client=info,",
    "frame_client::dispatch=debug,",
    "frame_client::liveness=debug"
);

fn log_dir() -> PathBuf {
    if let Some(state) = std::env::var_os("XDG_STATE_HOME")
        && !state.is_empty()
    {
        return PathBuf::from(state).join("frame-client");
    }
    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return PathBuf::from(home)
            .join(".local")
            .join("state")
            .join("frame-client");
    }
    std::env::temp_dir().join("frame-client")
}

fn init_logging(configured_filter: Option<&str>) -> anyhow::Result<()> {
    let log_dir = log_dir();
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "frame-client.log");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(configured_filter.unwrap_or(DEFAULT_LOG_FILTER))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender),
        )
        .init();

    let log_file = log_dir.join("frame-client.log");
    tracing::info!(path = %log_file.display(), "logging initialized");

    Ok(())
}
