//! # Terminal Event Loop
//!
//! Owns the terminal and multiplexes two sources: key presses from crossterm
//! and finished jobs coming back from background tasks. Remote calls are only
//! ever awaited on spawned tasks, so the screen keeps redrawing while a
//! request is outstanding.

use crate::app::{App, Done, Job};
use crate::ui::ui;
use anyhow::Result;
use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ragfile::RagService;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

type Term = Terminal<CrosstermBackend<Stdout>>;

fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Runs the interactive application until the user quits.
pub async fn run(service: Arc<dyn RagService>, server_url: &str, start_path: &str) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, service, server_url, start_path).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Term,
    service: Arc<dyn RagService>,
    server_url: &str,
    start_path: &str,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Done>();
    let mut events = EventStream::new();

    let mut app = App::new(server_url);
    info!("TUI started at '{start_path}'");
    let jobs = app.open_path(start_path);
    spawn_jobs(jobs, &service, &tx);

    while app.running {
        terminal.draw(|frame| ui(frame, &app))?;

        let jobs = tokio::select! {
            Some(event) = events.next() => match event? {
                Event::Key(key) => app.handle_key(key),
                _ => Vec::new(),
            },
            Some(done) = rx.recv() => app.apply(done),
            else => break,
        };
        spawn_jobs(jobs, &service, &tx);
    }

    info!("TUI exiting");
    Ok(())
}

fn spawn_jobs(jobs: Vec<Job>, service: &Arc<dyn RagService>, tx: &mpsc::UnboundedSender<Done>) {
    for job in jobs {
        debug!("Spawning {} job for visit #{}", job.effect.name(), job.visit);
        let service = Arc::clone(service);
        let tx = tx.clone();
        tokio::spawn(async move {
            let done = job.run(service.as_ref()).await;
            // The receiver is gone once the app has quit.
            let _ = tx.send(done);
        });
    }
}
