pub mod db_index_util;
pub mod password_util;
