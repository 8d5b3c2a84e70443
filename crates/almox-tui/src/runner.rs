// TUI event loop and terminal management
use crate::{Action, App};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

/// Upper bound on how long we block waiting for input, so the clock keeps moving
const MAX_POLL: Duration = Duration::from_millis(250);

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    // Initial load with the spinner up
    app.ctx.set_loading(true);
    terminal.draw(|f| crate::ui::render(f, app))?;
    app.ctx.start(Instant::now()).await;
    app.ctx.set_loading(false);
    app.sync_list_state();

    loop {
        terminal.draw(|f| crate::ui::render(f, app))?;

        let timeout = app
            .ctx
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(MAX_POLL)
            .min(MAX_POLL);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = app.handle_key(key, Instant::now()) {
                        run_action(terminal, app, action).await?;
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        let now = Instant::now();
        if app.ctx.sync_due(now) {
            app.ctx.set_loading(true);
            terminal.draw(|f| crate::ui::render(f, app))?;
        }
        app.tick(now).await;

        if app.should_quit {
            tracing::info!("Quitting");
            break;
        }
    }

    Ok(())
}

async fn run_action<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    action: Action,
) -> anyhow::Result<()> {
    tracing::debug!("running {:?}", action);

    if action.shows_spinner() {
        app.ctx.set_loading(true);
        terminal.draw(|f| crate::ui::render(f, app))?;
    }

    app.perform(action, Instant::now()).await;
    Ok(())
}
