//! API handlers for the tenancy domain

pub mod invitations;
