//! Terminal session and the main event loop.
//!
//! The loop is the only owner of [`FlapState`]. It waits on three sources and
//! handles one message at a time, in arrival order: scheduler ticks, poll
//! results, and terminal input.

use std::io::{self, Stdout};

use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::{Stream, StreamExt};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::{
    cluster::ClusterApi,
    config::Config,
    error::StartupError,
    monitor::Monitor,
    scheduler::{PollOutcome, Scheduler},
    ui::{events::is_quit_event, state::FlapState, view},
};

/// Takes over the terminal and runs the monitor until the user quits.
pub async fn run<C: ClusterApi>(monitor: Monitor<C>, config: &Config) -> Result<(), StartupError> {
    let mut terminal = setup_terminal()?;

    let (scheduler, results) = Scheduler::new(monitor, config.interval());
    let result = run_loop(&mut terminal, scheduler, results, EventStream::new(), config).await;

    let restored = restore_terminal(&mut terminal);
    result?;
    restored?;
    Ok(())
}

/// Event loop, generic over the backend and input source.
///
/// Returns when a quit key arrives or the input stream ends. Polls still in
/// flight are left to finish; their results are dropped with the receiver.
pub async fn run_loop<B, C, S>(
    terminal: &mut Terminal<B>,
    mut scheduler: Scheduler<C>,
    mut results: mpsc::UnboundedReceiver<PollOutcome>,
    mut input: S,
    config: &Config,
) -> io::Result<()>
where
    B: Backend,
    C: ClusterApi,
    S: Stream<Item = io::Result<Event>> + Unpin,
{
    let mut state = FlapState::default();
    draw(terminal, &state, config)?;

    loop {
        tokio::select! {
            _ = scheduler.tick() => {}
            Some(outcome) = results.recv() => {
                if state.apply(outcome) {
                    draw(terminal, &state, config)?;
                }
            }
            event = input.next() => match event {
                Some(Ok(event)) if is_quit_event(&event) => break,
                Some(Ok(Event::Resize(_, _))) => draw(terminal, &state, config)?,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => break,
            },
        }
    }

    tracing::info!("quit requested");
    Ok(())
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, state: &FlapState, config: &Config) -> io::Result<()> {
    terminal.draw(|f: &mut Frame| view::draw(f, f.area(), state, config))?;
    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal<B: Backend + io::Write>(terminal: &mut Terminal<B>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Best-effort terminal reset for the panic hook.
pub fn reset_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}
