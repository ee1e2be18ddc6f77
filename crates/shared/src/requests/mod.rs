//! Request bodies for the mutation endpoints.

mod advancement;
mod equipment;
mod fighter;

pub use advancement::{PurchaseCharacteristicRequest, PurchaseSkillRequest, UndoAdvancementRequest};
pub use equipment::{BuyEquipmentRequest, SellEquipmentRequest};
pub use fighter::{
    EditFighterStatusRequest, UpdateFighterDetailsRequest, UpdateFighterEffectsRequest,
    UpdateFighterXpRequest, UpdateFighterXpWithOoaRequest,
};
