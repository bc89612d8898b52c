use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use workdeck_query::Debouncer;

/// Search input state with debounced application. Every keystroke updates
/// the visible text immediately; the supplied work (filtering, the direct
/// id lookup) runs only once typing settles, superseding anything pending.
#[derive(Debug)]
pub struct DebouncedSearch {
    text: Arc<Mutex<String>>,
    debouncer: Debouncer,
}

impl DebouncedSearch {
    pub fn new(delay: Duration) -> Self {
        Self {
            text: Arc::new(Mutex::new(String::new())),
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn text(&self) -> String {
        self.text.lock().expect("search text lock poisoned").clone()
    }

    pub fn input<F, Fut>(&self, text: impl Into<String>, apply: F)
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let text = text.into();
        *self.text.lock().expect("search text lock poisoned") = text.clone();
        self.debouncer.schedule(apply(text));
    }

    /// Clear the input and drop any pending application.
    pub fn clear(&self) {
        self.text.lock().expect("search text lock poisoned").clear();
        self.debouncer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time;

    #[tokio::test]
    async fn rapid_typing_applies_only_the_final_query() {
        let search = DebouncedSearch::new(Duration::from_millis(20));
        let applied = Arc::new(Mutex::new(Vec::new()));

        for text in ["f", "fi", "fix"] {
            let applied = Arc::clone(&applied);
            search.input(text, move |query| async move {
                applied.lock().expect("applied lock poisoned").push(query);
            });
        }
        assert_eq!(search.text(), "fix");

        time::sleep(Duration::from_millis(120)).await;
        assert_eq!(
            *applied.lock().expect("applied lock poisoned"),
            vec!["fix".to_owned()]
        );
    }

    #[tokio::test]
    async fn clear_drops_the_pending_application() {
        let search = DebouncedSearch::new(Duration::from_millis(20));
        let applied = Arc::new(Mutex::new(Vec::<String>::new()));

        {
            let applied = Arc::clone(&applied);
            search.input("fix", move |query| async move {
                applied.lock().expect("applied lock poisoned").push(query);
            });
        }
        search.clear();

        time::sleep(Duration::from_millis(80)).await;
        assert!(applied.lock().expect("applied lock poisoned").is_empty());
        assert_eq!(search.text(), "");
    }
}
