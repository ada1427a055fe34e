use chrono::Utc;

/// Generates ids of the form `{prefix}-{unix_millis}-{counter}`.
///
/// The counter is monotonic for the generator's lifetime, so two ids minted
/// in the same millisecond still differ. Candidates already taken (e.g. by a
/// loaded template) are skipped.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    counter: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, prefix: &str, taken: impl Fn(&str) -> bool) -> String {
        loop {
            self.counter += 1;
            let id = format!("{prefix}-{}-{}", Utc::now().timestamp_millis(), self.counter);
            if !taken(&id) {
                return id;
            }
        }
    }
}
