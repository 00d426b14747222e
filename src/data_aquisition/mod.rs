/*
 * This module provides data aquisition abilites for the application.
 * It doesn't care what the bindings mean, just how they are fetched.
 */

pub mod core;
pub mod snmp;
pub mod walk;
