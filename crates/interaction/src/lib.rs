//! Interaction layer of the building viewer.
//!
//! Glues tileset loading, pick handling and overlay display on top of two
//! collaborators the hosts provide: a [`RenderEngine`] and a presentation
//! [`Surface`]. Everything here runs on one thread; the only suspension points
//! are asset fetches inside the registrar.

pub mod app;
pub mod dispatcher;
pub mod engine;
pub mod headless;
pub mod overlay;
pub mod readout;
pub mod registrar;
pub mod state;
pub mod surface;
pub mod viewer;

pub use app::*;
pub use dispatcher::*;
pub use engine::*;
pub use headless::*;
pub use readout::*;
pub use registrar::*;
pub use state::*;
pub use surface::*;
pub use viewer::*;
