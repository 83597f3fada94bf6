mod bootstrap;
mod loop_runner;
mod player;
mod settings;
mod states;

pub(crate) use loop_runner::run;
