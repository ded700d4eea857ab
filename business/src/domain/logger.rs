/// Logging port used by every cart component.
///
/// The business crate never talks to a logging backend directly; adapters
/// decide where messages end up.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn debug(&self, message: &str);
}
