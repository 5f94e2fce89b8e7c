pub mod corpus;
pub mod memberships;
pub mod topics;
