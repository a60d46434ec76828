mod runtime;

pub use runtime::{ensure_java_runtime, managed_java_binary};
