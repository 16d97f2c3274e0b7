/*
 * BFX-FIX GATEWAY - FIX TAG CONSTANTS
 * =================================================================
 * Component Name: src/fix/tags.rs
 * Core Responsibility: numeric FIX tags used directly by this crate,
 * kept as named constants so `fix::message` reads like the protocol
 * rather than a list of magic numbers.
 * =================================================================
 */

pub const ACCOUNT: i32 = 1;
pub const AVG_PX: i32 = 6;
pub const CL_ORD_ID: i32 = 11;
pub const CUM_QTY: i32 = 14;
pub const EXEC_ID: i32 = 17;
pub const EXEC_TRANSACT_TIME: i32 = 60;
pub const EXEC_TYPE: i32 = 150;
pub const LAST_PX: i32 = 31;
pub const LAST_QTY: i32 = 32;
pub const LEAVES_QTY: i32 = 151;
pub const MD_ENTRY_PX: i32 = 270;
pub const MD_ENTRY_SIZE: i32 = 271;
pub const MD_ENTRY_TYPE: i32 = 269;
pub const MD_REQ_ID: i32 = 262;
pub const SUBSCRIPTION_REQUEST_TYPE: i32 = 263;
pub const MARKET_DEPTH: i32 = 264;
pub const MD_UPDATE_ACTION: i32 = 279;
pub const NO_MD_ENTRIES: i32 = 268;
pub const ORD_REJ_REASON: i32 = 103;
pub const ORD_STATUS: i32 = 39;
pub const ORD_TYPE: i32 = 40;
pub const ORDER_ID: i32 = 37;
pub const ORDER_QTY: i32 = 38;
pub const ORIG_CL_ORD_ID: i32 = 41;
pub const PASSWORD: i32 = 554;
pub const PRICE: i32 = 44;
pub const RAW_DATA: i32 = 96;
pub const REF_MSG_TYPE: i32 = 372;
pub const SIDE: i32 = 54;
pub const SYMBOL: i32 = 55;
pub const TEXT: i32 = 58;
pub const TIME_IN_FORCE: i32 = 59;
pub const USERNAME: i32 = 553;
pub const CXL_REJ_REASON: i32 = 102;
pub const CXL_REJ_RESPONSE_TO: i32 = 434;
pub const BUSINESS_REJECT_REASON: i32 = 380;
