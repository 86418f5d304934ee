//! # Integration Flows
//!
//! Each module drives a fully wired node through the SECOM facade with
//! remote nodes replaced by recording clients.

#[cfg(test)]
mod harness;

#[cfg(test)]
mod ack_flow;
#[cfg(test)]
mod link_flow;
#[cfg(test)]
mod publish_flow;
#[cfg(test)]
mod subscription_flow;
