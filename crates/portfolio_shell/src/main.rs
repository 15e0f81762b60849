use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use crt_term::config::EnvConfig;
use crt_term::platform::{Osc52Clipboard, ProcessTerminal, TtySurface};
use crt_term::{
    default_editor_keybindings_handle, AxisRounding, CanvasGeometry, CellMapper, InputEvent,
    LineEditor, MouseButton, MouseKind, MouseReport, PlanarProjection,
    PointerButton, PointerEvent, PointerKind, ResizeDebouncer, ShellOptions, Terminal,
    TerminalGuard, TerminalShell, TerminalSurface, ViewportPoint, Vocabulary,
};
use log::info;
use portfolio_shell::{PortfolioEngine, PortfolioSource};

const EXIT_KEY: &str = "ctrl+d";
const IDLE_WAIT: Duration = Duration::from_millis(250);
const MULTI_CLICK_WINDOW: Duration = Duration::from_millis(400);

type Shell = TerminalShell<TtySurface<TerminalGuard<ProcessTerminal>>>;

enum Message {
    Input(Vec<InputEvent>),
    Resize,
    InputClosed,
}

/// Forwards input to the event loop and reports [`Message::InputClosed`] once the terminal drops
/// it, which happens when stdin hangs up.
struct InputSender(mpsc::Sender<Message>);

impl InputSender {
    fn send(&self, events: Vec<InputEvent>) {
        let _ = self.0.send(Message::Input(events));
    }
}

impl Drop for InputSender {
    fn drop(&mut self) {
        let _ = self.0.send(Message::InputClosed);
    }
}

fn main() -> io::Result<()> {
    let config = EnvConfig::from_env();
    crt_term::logging::init(&config);

    let source = match std::env::args_os().nth(1) {
        Some(path) => PortfolioSource::load(PathBuf::from(path)).map_err(io::Error::other)?,
        None => PortfolioSource::default(),
    };
    let (document, assets) = source.build();
    let context = document.to_context().map_err(io::Error::other)?;

    let (sender, receiver) = mpsc::channel();
    let input = InputSender(sender.clone());
    let mut terminal = TerminalGuard::new(ProcessTerminal::new(
        config.write_log.as_ref().map(PathBuf::from),
    ));
    terminal.start(
        Box::new(move |events| input.send(events)),
        Box::new(move || {
            let _ = sender.send(Message::Resize);
        }),
    )?;

    let mut options = ShellOptions {
        mouse_debug: config.debug_mouse,
        ..ShellOptions::default()
    };
    options.greeting.push("Press Ctrl+D to quit.".to_string());
    let mut resize = ResizeDebouncer::new(options.resize_debounce);

    let editor = LineEditor::new(
        Vocabulary::portfolio_default(),
        default_editor_keybindings_handle(),
    );
    let mut shell = TerminalShell::new(
        TtySurface::new(terminal),
        editor,
        PortfolioEngine::new(),
        options,
    )
    .with_assets(assets)
    .with_clipboard(Osc52Clipboard::new(io::stdout()))
    .with_mapper(grid_mapper());
    shell.set_context(context);
    shell.start();

    let mut clicks = ClickCounter::default();
    loop {
        let timeout = resize
            .next_timeout_ms(Instant::now())
            .map_or(IDLE_WAIT, Duration::from_millis);
        match receiver.recv_timeout(timeout) {
            Ok(Message::Input(events)) => {
                for event in &events {
                    if event.key_id() == Some(EXIT_KEY) {
                        return Ok(());
                    }
                    dispatch(&mut shell, &mut clicks, event);
                }
            }
            Ok(Message::Resize) => resize.trigger(Instant::now()),
            Ok(Message::InputClosed) => {
                info!("input closed, exiting");
                return Ok(());
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }
        if resize.fire_due(Instant::now()) {
            shell.surface_mut().refit();
        }
    }
}

/// Mouse reports arrive in cell units, so the viewport is the grid itself: one unit per cell,
/// flat, snapped to the cell containing the pointer.
fn grid_mapper() -> CellMapper {
    CellMapper::new(CanvasGeometry::new(1.0, 1.0, 0.0))
        .with_rounding(AxisRounding::Floor, AxisRounding::Floor)
}

fn dispatch(shell: &mut Shell, clicks: &mut ClickCounter, event: &InputEvent) {
    let InputEvent::Mouse(report) = event else {
        shell.handle_input(event);
        return;
    };
    let Some(dims) = shell.surface().dimensions() else {
        return;
    };
    let Some(pointer) = pointer_event(report, clicks, Instant::now()) else {
        return;
    };
    let projection = PlanarProjection::new(0.0, 0.0, dims.cols as f64, dims.rows as f64);
    if let Some(url) = shell.handle_pointer(&pointer, &projection) {
        info!("open link {url}");
        shell.notify(&link_notice(&url));
    }
}

/// The clicked URL as an OSC 8 hyperlink, which supporting terminals make clickable.
fn link_notice(url: &str) -> String {
    format!("Open link: \x1b]8;;{url}\x1b\\{url}\x1b]8;;\x1b\\")
}

fn pointer_event(
    report: &MouseReport,
    clicks: &mut ClickCounter,
    now: Instant,
) -> Option<PointerEvent> {
    let point = ViewportPoint::new(f64::from(report.col) + 0.5, f64::from(report.row) + 0.5);
    let button = match report.button {
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Left | MouseButton::None => PointerButton::Primary,
    };
    let kind = match report.kind {
        MouseKind::Press => PointerKind::Down {
            button,
            click_count: clicks.press((report.col, report.row), now),
        },
        MouseKind::Release => PointerKind::Up { button },
        MouseKind::Drag | MouseKind::Move => PointerKind::Move,
        MouseKind::Wheel => return None,
    };
    Some(PointerEvent { kind, point })
}

/// Counts presses on the same cell in quick succession, up to a triple click.
#[derive(Debug, Default)]
struct ClickCounter {
    last: Option<((u16, u16), Instant)>,
    count: u8,
}

impl ClickCounter {
    fn press(&mut self, cell: (u16, u16), now: Instant) -> u8 {
        self.count = match self.last {
            Some((last_cell, at)) if last_cell == cell && now.duration_since(at) <= MULTI_CLICK_WINDOW => {
                (self.count + 1).min(3)
            }
            _ => 1,
        };
        self.last = Some((cell, now));
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::{grid_mapper, link_notice, pointer_event, ClickCounter, InputSender, Message};
    use crt_term::{
        CellAddress, GridDimensions, MouseButton, MouseKind, MouseReport, PlanarProjection,
        PointerButton, PointerKind,
    };
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    fn report(kind: MouseKind, col: u16, row: u16) -> MouseReport {
        MouseReport {
            button: MouseButton::Left,
            kind,
            col,
            row,
        }
    }

    #[test]
    fn clicks_on_one_cell_escalate_to_triple() {
        let start = Instant::now();
        let mut clicks = ClickCounter::default();
        assert_eq!(clicks.press((3, 1), start), 1);
        assert_eq!(clicks.press((3, 1), start + Duration::from_millis(100)), 2);
        assert_eq!(clicks.press((3, 1), start + Duration::from_millis(200)), 3);
        assert_eq!(clicks.press((3, 1), start + Duration::from_millis(300)), 3);
        assert_eq!(clicks.press((4, 1), start + Duration::from_millis(350)), 1);
        assert_eq!(clicks.press((4, 1), start + Duration::from_secs(2)), 1);
    }

    #[test]
    fn mouse_reports_map_back_to_their_cell() {
        let mut clicks = ClickCounter::default();
        let pointer = pointer_event(&report(MouseKind::Press, 79, 23), &mut clicks, Instant::now())
            .expect("press maps to a pointer event");
        assert_eq!(
            pointer.kind,
            PointerKind::Down {
                button: PointerButton::Primary,
                click_count: 1
            }
        );

        let projection = PlanarProjection::new(0.0, 0.0, 80.0, 24.0);
        let cell = grid_mapper().map_pointer(
            &projection,
            pointer.point,
            Some(GridDimensions::new(80, 24)),
        );
        assert_eq!(cell, Some(CellAddress::new(79, 23)));

        let origin = pointer_event(&report(MouseKind::Drag, 0, 0), &mut clicks, Instant::now())
            .expect("drag maps to a pointer event");
        assert_eq!(origin.kind, PointerKind::Move);
        assert_eq!(
            grid_mapper().map_pointer(&projection, origin.point, Some(GridDimensions::new(80, 24))),
            Some(CellAddress::new(0, 0))
        );
    }

    #[test]
    fn wheel_is_ignored() {
        let mut clicks = ClickCounter::default();
        assert!(pointer_event(&report(MouseKind::Wheel, 1, 1), &mut clicks, Instant::now()).is_none());
    }

    #[test]
    fn dropping_the_input_sender_reports_closed_input() {
        let (sender, receiver) = mpsc::channel();
        let input = InputSender(sender);
        input.send(Vec::new());
        drop(input);
        assert!(matches!(receiver.recv(), Ok(Message::Input(events)) if events.is_empty()));
        assert!(matches!(receiver.recv(), Ok(Message::InputClosed)));
        assert!(receiver.recv().is_err());
    }

    #[test]
    fn link_notice_wraps_the_url_in_a_hyperlink() {
        let notice = link_notice("https://example.com");
        assert!(notice.starts_with("Open link: \x1b]8;;https://example.com\x1b\\"));
        assert!(notice.ends_with("https://example.com\x1b]8;;\x1b\\"));
    }
}
