//! One extraction state machine per supported shop.
//!
//! Each engine recognizes its shop's item-boundary element, raises and
//! lowers sub-context flags on structurally distinguishing tags, attributes
//! `text` events to whichever context is active, and finalizes an immutable
//! record when the boundary closes. Incomplete records are dropped there,
//! silently — extraction never fails on a structurally broken item.

pub mod alternate;
pub mod ldlc;
pub mod materielnet;
pub mod topachat;

pub use alternate::AlternateEngine;
pub use ldlc::LdlcEngine;
pub use materielnet::MaterielNetEngine;
pub use topachat::TopAchatEngine;
