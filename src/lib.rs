pub mod ast;
pub mod column;
pub mod data_type;
pub mod error;
pub mod ingest;
pub mod parser;
pub mod render;
pub mod schema;
pub mod table;
pub mod tokenizer;
pub mod value;

pub use ast::{ClauseMap, ClauseValue, ColumnsSelect};
pub use column::Column;
pub use data_type::DataType;
pub use error::{Error, Result};
pub use parser::Query;
pub use schema::Schema;
pub use table::{Axis, MAX_COLUMN_NAME_LEN, QueryResult, RowIndex, RowSpan, Table, TableData};
pub use value::Value;
