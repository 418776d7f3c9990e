//! Live Overlay Demo: Comments streaming across the terminal.
//!
//! A producer thread plays the part of a chat connection and sends
//! comments at an uneven rate; the main thread pumps the overlay on its
//! heartbeat and repaints the terminal every frame.
//!
//! Keys: `q`/Esc quit, `p` pause/play, `h` hide/show, `c` clear,
//! `u` unlimited lanes, `+`/`-` opacity, `1`/`2`/`3` speed.
//!
//! Set `RUST_LOG=danmaku=debug` and redirect stderr to a file to see the
//! scheduler's logs.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use danmaku::{
    CanvasSurface, ChannelSink, Comment, CommentKind, DanmakuConfig, DanmakuEvent, Overlay,
    ScrollSpeed, TerminalSession,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const LINES: &[&str] = &[
    "first!",
    "here we go again",
    "this part always gets me",
    "lol",
    "88888888",
    "who is watching in 2026",
    "the timing on that was perfect",
    "弾幕すごい",
    "wait what just happened",
    "ok that was clean",
    "replay that please",
    "hi from the back row",
];

const COLORS: &[u32] = &[0x00FF_FFFF, 0x00FF_D700, 0x0087_CEFA, 0x00FF_6F61, 0x0098_FB98];

/// Pretend chat connection: a comment every 40-200ms.
fn spawn_producer(tx: Sender<Comment>, running: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut n = 0usize;
        while running.load(Ordering::Relaxed) {
            let text = LINES[(n * 7) % LINES.len()];
            let kind = match n % 11 {
                3 => CommentKind::Top,
                7 => CommentKind::Bottom,
                _ => CommentKind::ScrollRight,
            };
            let comment = Comment::new(text)
                .with_kind(kind)
                .with_color(COLORS[(n * 3) % COLORS.len()]);
            if tx.send(comment).is_err() {
                break;
            }
            n += 1;
            thread::sleep(Duration::from_millis(40 + ((n * 37) % 160) as u64));
        }
    })
}

fn log_events(rx: &Receiver<DanmakuEvent>) {
    while let Ok(event) = rx.try_recv() {
        if !matches!(event, DanmakuEvent::CommentSent(_)) {
            tracing::info!(event = event.name(), "overlay event");
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init();
    }

    let mut session = TerminalSession::enter()?;
    let (width, height) = session.size()?;

    let config = DanmakuConfig {
        item_height: 1.0,
        lane_gap: 2.0,
        speed: ScrollSpeed::Custom(24.0),
        ..DanmakuConfig::default()
    };
    let (event_tx, event_rx) = bounded(64);
    let mut overlay = Overlay::new(config, CanvasSurface::new(width, height))?
        .with_events(ChannelSink::new(event_tx));

    let running = Arc::new(AtomicBool::new(true));
    let (comment_tx, comment_rx) = bounded::<Comment>(256);
    let producer = spawn_producer(comment_tx, running.clone());

    overlay.start();
    session.clear()?;

    'frames: while overlay.pump(Duration::from_millis(100)) {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break 'frames,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break 'frames;
                    }
                    KeyCode::Char('p') => {
                        if overlay.is_paused() {
                            overlay.play();
                        } else {
                            overlay.pause();
                        }
                    }
                    KeyCode::Char('h') => {
                        if overlay.is_showing() {
                            overlay.hide();
                        } else {
                            overlay.show();
                        }
                    }
                    KeyCode::Char('c') => overlay.clear(),
                    KeyCode::Char('u') => {
                        let unlimited = !overlay.is_unlimited();
                        overlay.unlimit(unlimited);
                    }
                    KeyCode::Char('+') => {
                        let current = overlay.opacity(None);
                        overlay.opacity(Some(current + 0.1));
                    }
                    KeyCode::Char('-') => {
                        let current = overlay.opacity(None);
                        overlay.opacity(Some(current - 0.1));
                    }
                    KeyCode::Char('1') => overlay.set_speed(ScrollSpeed::Custom(12.0)),
                    KeyCode::Char('2') => overlay.set_speed(ScrollSpeed::Custom(24.0)),
                    KeyCode::Char('3') => overlay.set_speed(ScrollSpeed::Custom(48.0)),
                    _ => {}
                },
                Event::Resize(w, h) => {
                    overlay.surface_mut().resize(w, h);
                    overlay.resize();
                    session.clear()?;
                }
                _ => {}
            }
        }

        loop {
            match comment_rx.try_recv() {
                Ok(comment) => overlay.send(comment),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'frames,
            }
        }
        log_events(&event_rx);

        let now = overlay.now();
        let canvas = overlay.surface_mut().paint(now);
        session.present(canvas)?;
    }

    running.store(false, Ordering::Relaxed);
    drop(comment_rx);
    overlay.destroy();
    let _ = producer.join();
    drop(session);

    println!("{} frames, {} comments received", overlay.frames(), overlay.feed().len());
    Ok(())
}
