// Routines for topic-quality diagnostics
pub mod diagnostics;
// Routines for evaluation
pub mod evaluation;
// Routines for initialization
pub mod initialization;
// Routines for logging
pub mod logger;
// Routines for optimization
pub mod optimization;
// Routines for output
pub mod output;
// Routines for settings
pub mod settings;
