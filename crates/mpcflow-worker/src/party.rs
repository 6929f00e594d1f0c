//! Role to MPC-party mapping.

use mpcflow_instance::Role;

/// Which side of the two-party protocol a job plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
  Server,
  Client,
}

impl Party {
  pub fn encoding(&self) -> u32 {
    match self {
      Self::Server => 0,
      Self::Client => 1,
    }
  }
}

/// Map a computation role onto its protocol party.
///
/// The publisher hosts the server side; the partner connects as the client.
pub fn role_to_party(role: Role) -> Party {
  match role {
    Role::Publisher => Party::Server,
    Role::Partner => Party::Client,
  }
}
