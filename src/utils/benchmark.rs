// File: benchmark.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

/// Evaluate an expression and log how long it took.
/// The first argument is a `Verbosity`; nothing is printed when it is not verbose.
#[macro_export]
macro_rules! measure_time {
    ($verbosity:expr, $label:expr, $e:expr) => {{
        let start = std::time::Instant::now();
        let result = $e;
        $verbosity.info(&format!("{} took {:.3?}", $label, start.elapsed()));
        result
    }};
}
