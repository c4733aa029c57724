//! Domain state of the call center: callers, servers, policies, caller
//! behavior and the hazard tables that link consecutive passes.

pub mod accumulators;
pub mod availability;
pub mod caller;
pub mod choice;
pub mod hazard;
pub mod policy;
pub mod server;

pub use accumulators::Accumulators;
pub use availability::AvailabilityCurve;
pub use caller::{Population, WaitingCaller};
pub use choice::{ChoiceModel, ClassUtility, Decision, LatentClass};
pub use hazard::{HazardCurve, HazardTables};
pub use policy::{CallbackOffer, Offer, OfflineMessage, Policy, PolicyBuilder, WaitPredictor, WindowSpec, POLICY_COUNT};
pub use server::{Server, ServerPool, ServerStatus};
