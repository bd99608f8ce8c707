//! # State Module
//!
//! View-models held by the front-end between service calls.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  OrderLedger::open_for_edit(session, id)                               │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  ┌──────────────────────────────────────────────┐                      │
//! │  │  OrderEditor                                 │                      │
//! │  │   • order      (owned, edited in memory)     │                      │
//! │  │   • catalog    (CatalogSnapshot, read-only)  │                      │
//! │  └──────────────────────────────────────────────┘                      │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  OrderLedger::save(&mut editor) / close(&mut editor, method, session)  │
//! │                                                                         │
//! │  The editor is a plain value: one per open order screen. Two screens   │
//! │  on the same order do not see each other; the last save wins.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod editor;

pub use editor::{CatalogSnapshot, OrderEditor};
