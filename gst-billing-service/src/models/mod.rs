//! Domain models for the GST billing service.

mod client;
mod company;
mod invoice;
mod item;
mod line_item;

pub use client::{Client, CreateClient, UpdateClient};
pub use company::{Company, UpdateCompany};
pub use invoice::{
    CreateInvoiceRequest, CreatedInvoice, Invoice, InvoiceItemRequest, InvoiceStatus,
    InvoiceSummary, ListInvoicesFilter,
};
pub use item::{CreateItem, Item, UpdateItem};
pub use line_item::InvoiceLine;
