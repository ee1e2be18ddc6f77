//! Gangbook Shared - Wire types for Engine and Client communication
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, uuid, serde_json and thiserror
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Raw ids in requests** - request bodies carry `uuid::Uuid`; responses
//!    embed domain entities, whose ids serialize as bare UUIDs

pub mod requests;
pub mod responses;

pub use requests::{
    BuyEquipmentRequest, EditFighterStatusRequest, PurchaseCharacteristicRequest,
    PurchaseSkillRequest, SellEquipmentRequest, UndoAdvancementRequest,
    UpdateFighterDetailsRequest, UpdateFighterEffectsRequest, UpdateFighterXpRequest,
    UpdateFighterXpWithOoaRequest,
};

pub use responses::{
    AdvancementPayload, AdvancementRecord, EquipmentPurchasePayload, EquipmentRemovalPayload,
    ErrorKind, FighterDetailsPayload, FighterEffectsPayload, FighterSnapshot,
    FighterStatusPayload, FighterTotalCostPayload, FighterXpPayload, MutationFailure,
    MutationResult,
};

/// Header carrying the acting user's id on every mutation request.
pub const USER_ID_HEADER: &str = "x-user-id";
