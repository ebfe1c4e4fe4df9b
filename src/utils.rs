use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn get_user_input() -> Result<u32> {
    println!("Введите ID книги: ");
    let mut book_id = String::new();
    io::stdin().read_line(&mut book_id)?;
    let book_id: u32 = book_id
        .trim()
        .parse()
        .context("ID книги должен быть числом")?;

    Ok(book_id)
}

/// `<book_id>.<extension>` in the current directory.
pub fn output_path(book_id: u32, extension: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", book_id, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_uses_extension() {
        assert_eq!(output_path(24, "fb2"), PathBuf::from("24.fb2"));
        assert_eq!(output_path(24, "fb2.zip"), PathBuf::from("24.fb2.zip"));
    }
}
