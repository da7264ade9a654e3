//! Session store: ordered history plus display navigation.

use huntchapter_core::{ChoiceMarker, EntryId, HistoryEntry, Mode, Scene, Session};

/// Snapshot of the history length and active index before a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    len: usize,
    active_index: usize,
}

/// Owns a session's history.
///
/// History only grows, except when a failed turn is rolled back to its
/// checkpoint or a fallback replay rebuilds it wholesale. Navigation moves
/// the active index and never touches history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStore {
    session: Session,
}

impl SessionStore {
    /// Take ownership of a session record.
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// The session record.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Give the record back.
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Position the next generated scene will occupy.
    pub fn next_position(&self) -> usize {
        self.session.scene_count() + 1
    }

    /// The last `count` real scenes, oldest first.
    pub fn recent_scenes(&self, count: usize) -> Vec<Scene> {
        let scenes: Vec<&Scene> = self.session.scenes().collect();
        let skip = scenes.len().saturating_sub(count);
        scenes.into_iter().skip(skip).cloned().collect()
    }

    /// Remember the current state for [`SessionStore::rollback`].
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            len: self.session.history.len(),
            active_index: self.session.active_index,
        }
    }

    /// Discard everything appended since `checkpoint` and restore the active index.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.session.history.truncate(checkpoint.len);
        self.session.active_index = checkpoint
            .active_index
            .min(self.session.history.len().saturating_sub(1));
    }

    /// Record a player choice. The active index is left alone.
    pub fn push_choice(&mut self, choice: &str) -> EntryId {
        let marker = ChoiceMarker::new(choice);
        let id = marker.id;
        self.session.history.push(marker.into());
        id
    }

    /// Append a scene and display it.
    pub fn push_scene(&mut self, scene: Scene) {
        self.session.history.push(scene.into());
        self.session.active_index = self.session.history.len() - 1;
    }

    /// Replace the whole history after a backend switch and display its last scene.
    pub fn rebuild(&mut self, history: Vec<HistoryEntry>, mode: Mode) {
        self.session.history = history;
        self.session.mode = mode;
        self.session.active_index = self
            .session
            .history
            .iter()
            .rposition(|entry| entry.as_scene().is_some())
            .unwrap_or(0);
    }

    /// Display the nearest earlier real scene. Returns whether the index moved.
    pub fn go_back(&mut self) -> bool {
        let current = self.session.active_index.min(self.session.history.len());
        match self.session.history[..current]
            .iter()
            .rposition(|entry| entry.as_scene().is_some())
        {
            Some(index) => {
                self.session.active_index = index;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huntchapter_core::{SceneBody, SceneContent, StoryParams};

    fn scene(narration: &str) -> Scene {
        Scene::from_content(
            SceneContent {
                narration: narration.to_string(),
                body: SceneBody::Normal {
                    options: ["a".to_string(), "b".to_string(), "c".to_string()],
                },
            },
            None,
        )
    }

    fn store() -> SessionStore {
        let params = StoryParams::new("Fantasy", "Epic", "second person", "Ruins");
        SessionStore::new(Session::new(params, Mode::Local, scene("Intro.")))
    }

    #[test]
    fn test_push_choice_keeps_active_index() {
        let mut store = store();
        store.push_choice("left");
        assert_eq!(store.session().active_index, 0);
        assert_eq!(store.session().history.len(), 2);
        store.push_scene(scene("Second."));
        assert_eq!(store.session().active_index, 2);
        assert_eq!(store.next_position(), 3);
    }

    #[test]
    fn test_rollback_restores_checkpoint() {
        let mut store = store();
        let checkpoint = store.checkpoint();
        store.push_choice("left");
        store.rollback(checkpoint);
        assert_eq!(store.session().history.len(), 1);
        assert_eq!(store.session().active_index, 0);
    }

    #[test]
    fn test_go_back_skips_markers_and_stops_at_zero() {
        let mut store = store();
        store.push_choice("left");
        store.push_scene(scene("Second."));
        store.push_choice("right");
        store.push_scene(scene("Third."));
        assert_eq!(store.session().active_index, 4);

        assert!(store.go_back());
        assert_eq!(store.session().active_index, 2);
        assert!(store.go_back());
        assert_eq!(store.session().active_index, 0);
        assert!(!store.go_back());
        assert_eq!(store.session().active_index, 0);
        assert_eq!(store.session().history.len(), 5);
    }

    #[test]
    fn test_recent_scenes_window() {
        let mut store = store();
        for i in 0..5 {
            store.push_choice("go");
            store.push_scene(scene(&format!("Scene {}", i + 2)));
        }
        let recent = store.recent_scenes(4);
        assert_eq!(recent.len(), 4);
        assert_eq!(recent[0].narration, "Scene 3");
        assert_eq!(recent[3].narration, "Scene 6");
    }

    #[test]
    fn test_rebuild_switches_mode() {
        let mut store = store();
        let history = vec![
            HistoryEntry::from(scene("Remote intro.")),
            ChoiceMarker::new("left").into(),
            scene("Remote second.").into(),
        ];
        store.rebuild(history, Mode::Remote);
        assert_eq!(store.session().mode, Mode::Remote);
        assert_eq!(store.session().active_index, 2);
        assert_eq!(store.session().player_choices(), vec!["left"]);
    }
}
