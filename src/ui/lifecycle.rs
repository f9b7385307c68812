use std::io::{self, Stdout, Write};

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::Terminal;

pub type TwigTerminal<W = Stdout> = Terminal<CrosstermBackend<W>>;

pub fn setup_terminal() -> io::Result<TwigTerminal> {
    enter_screen()?;

    let backend = CrosstermBackend::new(io::stdout());
    Terminal::new(backend).inspect_err(|_| {
        let _ = leave_screen();
    })
}

pub fn restore_terminal<W: Write>(terminal: &mut TwigTerminal<W>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    terminal.show_cursor()
}

/// Switch the process terminal into raw mode on the alternate screen.
pub fn enter_screen() -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Clear(ClearType::All), Hide)
}

/// Undo [`enter_screen`] without a terminal handle. Used by the panic hook
/// and on suspend.
pub fn leave_screen() -> io::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, Show)?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_terminal_round_trips_when_a_tty_is_available() {
        // crossterm cannot switch modes without a real terminal, so headless
        // runs only check that a failed setup does not leave raw mode on.
        if let Ok(mut terminal) = setup_terminal() {
            let _ = restore_terminal(&mut terminal);
        }
    }
}
