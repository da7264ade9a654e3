//! Interactive terminal play.

use super::PlayArgs;
use huntchapter::server::StartGame;
use huntchapter::{
    EngineError, FileSessionRepository, HistoryEntry, HuntChapterConfig, HuntChapterResult,
    Runtime, Scene, SceneBody, Session, SessionId, SessionRepository, StorageError,
    StorageErrorKind, StoryEngine, Universe,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// What the player typed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Quit,
    Back,
    Number(usize),
    Text(String),
}

impl Input {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => None,
            "q" | "quit" | "exit" => Some(Self::Quit),
            "b" | "back" => Some(Self::Back),
            _ => match line.parse::<usize>() {
                Ok(n) if n > 0 => Some(Self::Number(n)),
                _ => Some(Self::Text(line.to_string())),
            },
        }
    }
}

fn render_scene(scene: &Scene, position: usize) {
    println!();
    println!("── Scene {} ──", position);
    println!("{}", scene.narration);
    if let Some(image) = &scene.image {
        if !image.is_data_uri() {
            println!("[illustration: {}]", image.as_str());
        }
    }
    println!();
    match &scene.body {
        SceneBody::Normal { options } => {
            for (i, option) in options.iter().enumerate() {
                println!("  {}. {}", i + 1, option);
            }
            println!("Pick a number, type your own action, 'b' to look back or 'q' to quit.");
        }
        SceneBody::Challenge { challenge } => {
            println!("{}", challenge.question);
            for (i, choice) in challenge.choices.iter().enumerate() {
                println!("  {}. {}", i + 1, choice);
            }
            println!("Answer with a number, 'b' to look back or 'q' to quit.");
        }
        SceneBody::Ending {
            outcome,
            ending_title,
        } => {
            if let Some(title) = ending_title {
                println!("*** {} ***", title);
            }
            println!("The story ends: {}.", outcome);
        }
    }
}

/// Render the entry currently displayed.
fn render_active(session: &Session) {
    let Some(HistoryEntry::Scene(scene)) = session.active_entry() else {
        return;
    };
    let position = session
        .scenes()
        .position(|s| s.id == scene.id)
        .map(|i| i + 1)
        .unwrap_or(1);
    render_scene(scene, position);
}

fn report(e: &EngineError) {
    eprintln!("! {}", e.kind);
    if e.is_fatal() {
        eprintln!("! The story cannot continue.");
    }
}

async fn save(repository: Option<&FileSessionRepository>, engine: &StoryEngine) {
    let (Some(repository), Some(session)) = (repository, engine.session()) else {
        return;
    };
    if let Err(e) = repository.save(&session).await {
        warn!(error = %e, "Could not save session");
    }
}

/// Play one story on the terminal.
pub async fn play(config: HuntChapterConfig, args: PlayArgs) -> HuntChapterResult<()> {
    let sessions_file = config.server().sessions_file().clone();
    let runtime = Runtime::from_config(config)?;
    let engine = runtime.engine();
    let repository = (args.save || args.resume.is_some())
        .then(|| FileSessionRepository::new(&sessions_file));

    let session = match &args.resume {
        Some(raw) => {
            let id: SessionId = raw
                .parse()
                .map_err(|_| StorageError::new(StorageErrorKind::NotFound(raw.clone())))?;
            let repo = FileSessionRepository::new(&sessions_file);
            let session = repo.load(id).await?;
            engine.resume(session.clone())?;
            info!(session = %id, "Resumed");
            session
        }
        None => {
            let request = StartGame {
                universe: args
                    .universe
                    .or_else(|| args.genre.is_none().then_some(Universe::Arcanes)),
                genre: args.genre.clone(),
                tone: args.tone.clone(),
                pov: args.pov.clone(),
                setting: args.setting.clone(),
            };
            let params = request
                .into_params()
                .map_err(|e| huntchapter::ConfigError::new(e.body.error))?;
            println!("Preparing your story...");
            engine.start_game(params).await?
        }
    };
    println!("Session {}", session.id);
    save(repository.as_ref(), &engine).await;
    render_active(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if engine.session().is_some_and(|s| s.is_ended()) {
            break;
        }
        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::FileRead(format!("stdin: {}", e))))?
        else {
            break;
        };
        let Some(input) = Input::parse(&line) else {
            continue;
        };

        let latest_is_challenge = engine
            .session()
            .and_then(|s| s.latest_scene().map(|scene| scene.challenge().is_some()))
            .unwrap_or(false);

        let outcome = match input {
            Input::Quit => break,
            Input::Back => engine.go_back(),
            Input::Number(n) if latest_is_challenge => {
                println!("...");
                engine.answer_challenge(n - 1).await
            }
            Input::Number(n) => {
                let option = engine.session().and_then(|s| {
                    s.latest_scene()
                        .and_then(|scene| scene.options().and_then(|o| o.get(n - 1).cloned()))
                });
                match option {
                    Some(option) => {
                        println!("...");
                        engine.submit_choice(&option).await
                    }
                    None => {
                        eprintln!("! No option {}", n);
                        continue;
                    }
                }
            }
            Input::Text(text) => {
                println!("...");
                engine.submit_choice(&text).await
            }
        };

        match outcome {
            Ok(session) => {
                save(repository.as_ref(), &engine).await;
                render_active(&session);
            }
            Err(e) => {
                report(&e);
                if e.is_fatal() {
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
