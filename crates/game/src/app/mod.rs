mod bootstrap;
mod demo;
mod loop_runner;
mod scenario;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;
