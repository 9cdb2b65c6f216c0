/// Reading and writing the rental table.
pub mod table;
pub use table::{HEADERS, Table, TableError};

mod store;
pub use store::{DeletePolicy, RentalStore, StoreError};
