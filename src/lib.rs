//! Order management client core: route table, navigation, and the
//! authentication guard that gates protected routes on the hosted identity
//! provider.
//!
//! SYSTEM CONTEXT
//! ==============
//! A navigation enters the [`navigator::Navigator`], is resolved by the
//! [`routing::Router`], passes the guard chain (the [`guard::AuthGuard`]
//! among it), loads its view, and only then commits. Identity is observed
//! from an [`identity::IdentityProvider`], never owned here.

pub mod app;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod navigator;
pub mod notify;
pub mod routing;
