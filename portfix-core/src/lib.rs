//! Embeddable core library for portfix.
//!
//! Provides a clap-free, I/O-abstracted entry point for planning a
//! migration, translating files, and driving a generated project toward a
//! compilable state.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`BuildInvoker`](ports::BuildInvoker): run the external build
//! - [`Oracle`](ports::Oracle): the generative model
//! - [`ContentProvider`](ports::ContentProvider): source file contents
//! - [`WritePort`](ports::WritePort): write files and create directories
//! - [`RepoView`](ports::RepoView): read the project being repaired
//!
//! The [`adapters`], [`scan`] and [`oracle`] modules provide default
//! filesystem-, process- and HTTP-backed implementations.
//!
//! # Entry points
//!
//! - [`create_plan`](planning::create_plan): ask the oracle for a migration plan
//! - [`scaffold_project`](scaffold::scaffold_project): lay out the target project
//! - [`translate_all`](translate::translate_all): translate every mapped file
//! - [`run_repair_loop`](heal::run_repair_loop): build, diagnose, repair, repeat

pub mod adapters;
pub mod cancel;
pub mod dispatch;
pub mod error;
pub mod heal;
pub mod oracle;
pub mod planning;
pub mod ports;
pub mod scaffold;
pub mod scan;
pub mod settings;
pub mod translate;

pub use cancel::CancellationToken;
pub use error::ToolError;
