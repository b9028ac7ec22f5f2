//! The fixed, ordered universe of books a search book set selects from.

use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::models::{Book, BookId, Testament};

/// OSIS identifiers and display names of the 66-book Protestant canon, in
/// canonical order.
const OLD_TESTAMENT: &[(&str, &str)] = &[
    ("Gen", "Genesis"),
    ("Exod", "Exodus"),
    ("Lev", "Leviticus"),
    ("Num", "Numbers"),
    ("Deut", "Deuteronomy"),
    ("Josh", "Joshua"),
    ("Judg", "Judges"),
    ("Ruth", "Ruth"),
    ("1Sam", "I Samuel"),
    ("2Sam", "II Samuel"),
    ("1Kgs", "I Kings"),
    ("2Kgs", "II Kings"),
    ("1Chr", "I Chronicles"),
    ("2Chr", "II Chronicles"),
    ("Ezra", "Ezra"),
    ("Neh", "Nehemiah"),
    ("Esth", "Esther"),
    ("Job", "Job"),
    ("Ps", "Psalms"),
    ("Prov", "Proverbs"),
    ("Eccl", "Ecclesiastes"),
    ("Song", "Song of Solomon"),
    ("Isa", "Isaiah"),
    ("Jer", "Jeremiah"),
    ("Lam", "Lamentations"),
    ("Ezek", "Ezekiel"),
    ("Dan", "Daniel"),
    ("Hos", "Hosea"),
    ("Joel", "Joel"),
    ("Amos", "Amos"),
    ("Obad", "Obadiah"),
    ("Jonah", "Jonah"),
    ("Mic", "Micah"),
    ("Nah", "Nahum"),
    ("Hab", "Habakkuk"),
    ("Zeph", "Zephaniah"),
    ("Hag", "Haggai"),
    ("Zech", "Zechariah"),
    ("Mal", "Malachi"),
];

const NEW_TESTAMENT: &[(&str, &str)] = &[
    ("Matt", "Matthew"),
    ("Mark", "Mark"),
    ("Luke", "Luke"),
    ("John", "John"),
    ("Acts", "Acts"),
    ("Rom", "Romans"),
    ("1Cor", "I Corinthians"),
    ("2Cor", "II Corinthians"),
    ("Gal", "Galatians"),
    ("Eph", "Ephesians"),
    ("Phil", "Philippians"),
    ("Col", "Colossians"),
    ("1Thess", "I Thessalonians"),
    ("2Thess", "II Thessalonians"),
    ("1Tim", "I Timothy"),
    ("2Tim", "II Timothy"),
    ("Titus", "Titus"),
    ("Phlm", "Philemon"),
    ("Heb", "Hebrews"),
    ("Jas", "James"),
    ("1Pet", "I Peter"),
    ("2Pet", "II Peter"),
    ("1John", "I John"),
    ("2John", "II John"),
    ("3John", "III John"),
    ("Jude", "Jude"),
    ("Rev", "Revelation of John"),
];

/// Read-only, ordered list of canonical books. Built once at start-up and
/// shared by every set; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCatalog {
    books: Vec<Book>,
    positions: HashMap<BookId, usize>,
}

impl BookCatalog {
    /// Build a catalog from an ordered list. Ids must be unique.
    pub fn new(books: Vec<Book>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(books.len());
        for (index, book) in books.iter().enumerate() {
            if positions.insert(book.id.clone(), index).is_some() {
                return Err(anyhow!("duplicate book id '{}' in catalog", book.id));
            }
        }
        Ok(Self { books, positions })
    }

    /// The 66-book Protestant canon.
    pub fn canonical() -> Self {
        let books = OLD_TESTAMENT
            .iter()
            .map(|entry| (entry, Testament::Old))
            .chain(NEW_TESTAMENT.iter().map(|entry| (entry, Testament::New)))
            .map(|(&(id, name), testament)| Book {
                id: BookId::from(id),
                name: name.to_string(),
                testament,
            })
            .collect::<Vec<_>>();
        let positions = books
            .iter()
            .enumerate()
            .map(|(index, book)| (book.id.clone(), index))
            .collect();
        Self { books, positions }
    }

    pub fn list(&self) -> &[Book] {
        &self.books
    }

    pub fn ids(&self) -> impl Iterator<Item = &BookId> {
        self.books.iter().map(|book| &book.id)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn contains(&self, id: &BookId) -> bool {
        self.positions.contains_key(id)
    }

    pub fn get(&self, id: &BookId) -> Option<&Book> {
        self.position(id).map(|index| &self.books[index])
    }

    pub fn position(&self, id: &BookId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Books of one testament in catalog order.
    pub fn testament(&self, testament: Testament) -> impl Iterator<Item = &Book> {
        self.books
            .iter()
            .filter(move |book| book.testament == testament)
    }
}
