//! Terminal front end: draws a [`Frame`] with crossterm and turns mouse and key input
//! into [`SandboxEvent`]s. Canvas units are scaled to terminal cells.
use crate::sandbox::controller::{Command, Flow, Sandbox, SandboxEvent};
use crate::sandbox::frame::{Frame, TextItem};
use crate::sandbox::layout::Rect;
use crate::sandbox::sandbox_error::SandboxError;
use crate::sandbox::token::Side;
use crossterm::event::{
    Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::{cursor, event, execute, queue, terminal};
use log::{debug, info};
use std::io::{self, Stdout, Write};
use std::time::Duration;

const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Conversion between canvas units and terminal cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellScale {
    pub sx: f32,
    pub sy: f32,
    pub cols: u16,
    pub rows: u16,
}

impl CellScale {
    pub fn new(width: f32, height: f32, cols: u16, rows: u16) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        CellScale {
            sx: width / cols as f32,
            sy: height / rows as f32,
            cols,
            rows,
        }
    }

    /// Cell containing a canvas point, clamped to the screen
    pub fn to_cell(&self, point: (f32, f32)) -> (u16, u16) {
        let col = (point.0 / self.sx).floor().clamp(0.0, (self.cols - 1) as f32);
        let row = (point.1 / self.sy).floor().clamp(0.0, (self.rows - 1) as f32);
        (col as u16, row as u16)
    }

    /// Canvas point at the centre of a cell
    pub fn to_canvas(&self, col: u16, row: u16) -> (f32, f32) {
        ((col as f32 + 0.5) * self.sx, (row as f32 + 0.5) * self.sy)
    }
}

/// Maps a terminal event to a sandbox event; `None` for everything the sandbox ignores.
pub fn map_event(event: &Event, scale: &CellScale) -> Option<SandboxEvent> {
    match event {
        Event::Mouse(mouse) => {
            let (x, y) = scale.to_canvas(mouse.column, mouse.row);
            match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => Some(SandboxEvent::PointerDown(x, y)),
                MouseEventKind::Drag(MouseButton::Left) => Some(SandboxEvent::PointerMove(x, y)),
                MouseEventKind::Up(MouseButton::Left) => Some(SandboxEvent::PointerUp),
                _ => None,
            }
        }
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Esc => Some(SandboxEvent::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(SandboxEvent::Quit)
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(SandboxEvent::Quit),
            KeyCode::Char(c) => Command::from_key(c).map(SandboxEvent::Key),
            _ => None,
        },
        _ => None,
    }
}

/// Raw mode, alternate screen and mouse capture for as long as the value lives.
pub struct TerminalCanvas {
    stdout: Stdout,
    cols: u16,
    rows: u16,
}

impl TerminalCanvas {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(
            stdout,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide
        ) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        let (cols, rows) = terminal::size()?;
        debug!("terminal canvas {}x{} cells", cols, rows);
        Ok(TerminalCanvas { stdout, cols, rows })
    }

    pub fn scale(&self, frame: &Frame) -> CellScale {
        CellScale::new(frame.width, frame.height, self.cols, self.rows)
    }

    pub fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        let scale = self.scale(frame);
        queue!(self.stdout, terminal::Clear(terminal::ClearType::All))?;

        for side_box in &frame.boxes {
            self.draw_rect(&side_box.rect, &scale)?;
            self.draw_text(&side_box.label, &scale, Color::White)?;
        }
        self.draw_text(&frame.equals, &scale, Color::White)?;

        for token in &frame.tokens {
            let color = match (token.dragging, token.side) {
                (true, _) => Color::Yellow,
                (false, Side::Lhs) => Color::Cyan,
                (false, Side::Rhs) => Color::Magenta,
            };
            let item = TextItem::new(token.label.clone(), token.at);
            self.draw_text(&item, &scale, color)?;
        }
        if let Some(solution) = &frame.solution {
            self.draw_text(solution, &scale, Color::Green)?;
        }
        for entry in &frame.history {
            self.draw_text(entry, &scale, Color::Grey)?;
        }

        let help = "drag tokens with the mouse | s solve  i integrate  d differentiate | q quit";
        queue!(
            self.stdout,
            cursor::MoveTo(0, self.rows.saturating_sub(1)),
            SetForegroundColor(Color::DarkGrey),
            Print(truncate(help, self.cols as usize)),
            ResetColor
        )?;
        self.stdout.flush()
    }

    fn draw_rect(&mut self, rect: &Rect, scale: &CellScale) -> io::Result<()> {
        let (left, top) = scale.to_cell((rect.x, rect.y));
        let (right, bottom) = scale.to_cell((rect.x + rect.w, rect.y + rect.h));
        if right <= left || bottom <= top {
            return Ok(());
        }
        let inner = (right - left - 1) as usize;
        queue!(self.stdout, SetForegroundColor(Color::DarkGrey))?;
        queue!(
            self.stdout,
            cursor::MoveTo(left, top),
            Print(format!("┌{}┐", "─".repeat(inner)))
        )?;
        for row in top + 1..bottom {
            queue!(
                self.stdout,
                cursor::MoveTo(left, row),
                Print("│"),
                cursor::MoveTo(right, row),
                Print("│")
            )?;
        }
        queue!(
            self.stdout,
            cursor::MoveTo(left, bottom),
            Print(format!("└{}┘", "─".repeat(inner))),
            ResetColor
        )
    }

    fn draw_text(&mut self, item: &TextItem, scale: &CellScale, color: Color) -> io::Result<()> {
        let (col, row) = scale.to_cell(item.at);
        let room = self.cols.saturating_sub(col) as usize;
        queue!(
            self.stdout,
            cursor::MoveTo(col, row),
            SetForegroundColor(color),
            Print(truncate(&item.text, room)),
            ResetColor
        )
    }

    /// Waits up to `timeout` for input and maps it against the current frame.
    pub fn next_event(
        &mut self,
        frame: &Frame,
        timeout: Duration,
    ) -> io::Result<Option<SandboxEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let event = event::read()?;
        if let Event::Resize(cols, rows) = event {
            debug!("terminal resized to {}x{}", cols, rows);
            self.cols = cols;
            self.rows = rows;
            return Ok(None);
        }
        Ok(map_event(&event, &self.scale(frame)))
    }
}

impl Drop for TerminalCanvas {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            cursor::Show,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

fn truncate(text: &str, room: usize) -> String {
    text.chars().take(room).collect()
}

/// Runs the sandbox in the terminal until the user quits or a command fails.
pub fn run_interactive(sandbox: &mut Sandbox) -> Result<(), SandboxError> {
    let mut canvas = TerminalCanvas::enter()?;
    info!("interactive session started");
    loop {
        let frame = sandbox.frame();
        canvas.draw(&frame)?;
        if let Some(event) = canvas.next_event(&frame, POLL_TIMEOUT)? {
            if sandbox.handle(event)? == Flow::Quit {
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, MouseEvent};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_scale_round_trip() {
        let scale = CellScale::new(1000.0, 600.0, 100, 30);
        assert_eq!((scale.sx, scale.sy), (10.0, 20.0));
        assert_eq!(scale.to_cell((200.0, 200.0)), (20, 10));
        assert_eq!(scale.to_canvas(20, 10), (205.0, 210.0));
        assert_eq!(scale.to_cell((5000.0, -10.0)), (99, 0));
    }

    #[test]
    fn test_map_mouse_events() {
        let scale = CellScale::new(1000.0, 600.0, 100, 30);
        assert_eq!(
            map_event(&mouse(MouseEventKind::Down(MouseButton::Left), 20, 10), &scale),
            Some(SandboxEvent::PointerDown(205.0, 210.0))
        );
        assert_eq!(
            map_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 70, 10), &scale),
            Some(SandboxEvent::PointerMove(705.0, 210.0))
        );
        assert_eq!(
            map_event(&mouse(MouseEventKind::Up(MouseButton::Left), 70, 10), &scale),
            Some(SandboxEvent::PointerUp)
        );
        assert_eq!(
            map_event(&mouse(MouseEventKind::Down(MouseButton::Right), 1, 1), &scale),
            None
        );
    }

    #[test]
    fn test_map_keys() {
        let scale = CellScale::new(1000.0, 600.0, 100, 30);
        let key = |code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(
            map_event(&key(KeyCode::Char('s')), &scale),
            Some(SandboxEvent::Key(Command::Solve))
        );
        assert_eq!(
            map_event(&key(KeyCode::Char('d')), &scale),
            Some(SandboxEvent::Key(Command::Differentiate))
        );
        assert_eq!(map_event(&key(KeyCode::Esc), &scale), Some(SandboxEvent::Quit));
        assert_eq!(map_event(&key(KeyCode::Char('q')), &scale), Some(SandboxEvent::Quit));
        assert_eq!(map_event(&key(KeyCode::Char('z')), &scale), None);
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&ctrl_c, &scale), Some(SandboxEvent::Quit));
    }

    #[test]
    fn test_mouse_drag_moves_token_across() {
        use crate::sandbox::variant::Variant;
        let mut sandbox = Sandbox::from_input("2*x + 3", "x", Variant::Split, 5).unwrap();
        let scale = CellScale::new(1000.0, 600.0, 100, 30);
        for event in [
            mouse(MouseEventKind::Down(MouseButton::Left), 15, 10),
            mouse(MouseEventKind::Drag(MouseButton::Left), 70, 10),
            mouse(MouseEventKind::Up(MouseButton::Left), 70, 10),
        ] {
            if let Some(event) = map_event(&event, &scale) {
                sandbox.handle(event).unwrap();
            }
        }
        assert_eq!(sandbox.equation().to_string(), "x/2 + 3 = 0");
    }
}
