//! Server and session listing command handlers.

use huntchapter::{
    FileSessionRepository, HuntChapterConfig, HuntChapterResult, JsonError, Runtime,
    SessionRepository,
};

/// Run the HTTP server.
pub async fn serve(config: HuntChapterConfig, bind: Option<String>) -> HuntChapterResult<()> {
    let runtime = Runtime::from_config(config)?;
    huntchapter::server::serve(runtime, bind).await
}

/// Print saved sessions, newest first.
pub async fn list_sessions(config: HuntChapterConfig, json: bool) -> HuntChapterResult<()> {
    let repository = FileSessionRepository::new(config.server().sessions_file());
    let sessions = repository.list().await?;
    if json {
        let document = serde_json::to_string_pretty(&sessions)
            .map_err(|e| JsonError::new("session summaries", e))?;
        println!("{}", document);
        return Ok(());
    }
    if sessions.is_empty() {
        println!("No saved sessions in {}", repository.path().display());
        return Ok(());
    }
    for summary in sessions {
        println!(
            "{}  {}  {} / {}  {} scenes{}  [{}]",
            summary.id,
            summary.started_at.format("%Y-%m-%d %H:%M"),
            summary.params.genre(),
            summary.params.setting(),
            summary.scenes,
            if summary.ended { ", ended" } else { "" },
            summary.mode
        );
    }
    Ok(())
}
