use tracing::debug;

/// Fire-and-forget progress sink owned by a single extraction run.
#[derive(Clone, Copy, Default)]
pub struct Progress<'a> {
    sink: Option<&'a (dyn Fn(&str) + Send + Sync)>,
}

impl<'a> Progress<'a> {
    pub fn new(sink: &'a (dyn Fn(&str) + Send + Sync)) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn none() -> Self {
        Self { sink: None }
    }

    pub fn report(&self, message: &str) {
        debug!(progress = message);
        if let Some(sink) = self.sink {
            sink(message);
        }
    }
}

impl std::fmt::Debug for Progress<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}
