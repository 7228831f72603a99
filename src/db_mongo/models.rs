use mongodb::bson::Document;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A stored book. Records are schema-flexible: any recognized field may be
/// absent, and fields outside the recognized set are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(flatten)]
    pub extra: Document,
}

/// Projected row: title, author and price only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BookSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreAveragePrice {
    #[serde(rename = "_id")]
    pub genre: Option<String>,
    #[serde(rename = "averagePrice")]
    pub average_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorBookCount {
    #[serde(rename = "_id")]
    pub author: Option<String>,
    #[serde(rename = "totalBooks")]
    pub total_books: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecadeBookCount {
    #[serde(rename = "_id")]
    pub decade: Option<i32>,
    #[serde(rename = "totalBooks")]
    pub total_books: i64,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        published_year: i32,
        price: f64,
        in_stock: bool,
    ) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            author: Some(author.into()),
            genre: Some(genre.into()),
            published_year: Some(published_year),
            price: Some(price),
            in_stock: Some(in_stock),
            extra: Document::new(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    #[test]
    fn decodes_stored_book() {
        let id = ObjectId::new();
        let stored = doc! {
            "_id": id,
            "title": "1984",
            "author": "George Orwell",
            "genre": "Dystopian",
            "published_year": 1949,
            "price": 10.99,
            "in_stock": true,
        };

        let book: Book = bson::from_document(stored).unwrap();
        assert_eq!(book.id, Some(id));
        assert_eq!(book.title(), Some("1984"));
        assert_eq!(book.published_year, Some(1949));
        assert_eq!(book.in_stock, Some(true));
        assert!(book.extra.is_empty());
    }

    #[test]
    fn partial_record_still_decodes() {
        let stored = doc! {
            "title": "Untitled Draft",
            "author": "Anonymous",
            "genre": "Fiction",
            "published_year": 2001,
            "price": 4.5,
        };

        let book: Book = bson::from_document(stored).unwrap();
        assert_eq!(book.in_stock, None);
        assert_eq!(book.price, Some(4.5));

        let bare: Book = bson::from_document(doc! { "title": "Only a title" }).unwrap();
        assert_eq!(bare.author, None);
        assert_eq!(bare.published_year, None);
    }

    #[test]
    fn extra_fields_survive_a_round_through_the_model() {
        let stored = doc! {
            "title": "1984",
            "author": "George Orwell",
            "genre": "Dystopian",
            "published_year": 1949,
            "price": 10.99,
            "in_stock": true,
            "pages": 328,
            "publisher": "Secker & Warburg",
        };

        let book: Book = bson::from_document(stored).unwrap();
        assert_eq!(book.extra.get_i32("pages").unwrap(), 328);

        let encoded = bson::to_document(&book).unwrap();
        assert_eq!(encoded.get_str("publisher").unwrap(), "Secker & Warburg");
        assert_eq!(encoded.get_i32("pages").unwrap(), 328);
        assert!(!encoded.contains_key("extra"));
    }

    #[test]
    fn missing_fields_are_not_printed_as_null() {
        let book: Book = bson::from_document(doc! { "title": "Only a title" }).unwrap();
        let encoded = bson::to_document(&book).unwrap();
        assert_eq!(encoded, doc! { "title": "Only a title" });
    }

    #[test]
    fn accepts_integer_price() {
        let stored = doc! { "title": "Dune", "price": 12 };

        let book: Book = bson::from_document(stored).unwrap();
        assert_eq!(book.price, Some(12.0));
    }

    #[test]
    fn new_book_omits_id_when_serialized() {
        let book = Book::new("Emma", "Jane Austen", "Romance", 1815, 7.5, true);
        let encoded = bson::to_document(&book).unwrap();
        assert!(!encoded.contains_key("_id"));
        assert_eq!(encoded.get_str("genre").unwrap(), "Romance");
    }

    #[test]
    fn decodes_projected_row_without_id() {
        let row = doc! { "title": "Emma", "author": "Jane Austen", "price": 7.5 };
        let summary: BookSummary = bson::from_document(row).unwrap();
        assert_eq!(summary.author.as_deref(), Some("Jane Austen"));

        let partial: BookSummary = bson::from_document(doc! { "title": "Emma" }).unwrap();
        assert_eq!(partial.price, None);
    }

    #[test]
    fn decodes_aggregation_rows() {
        let avg: GenreAveragePrice =
            bson::from_document(doc! { "_id": "Fiction", "averagePrice": 11.25 }).unwrap();
        assert_eq!(avg.genre.as_deref(), Some("Fiction"));
        assert_eq!(avg.average_price, Some(11.25));

        let no_prices: GenreAveragePrice =
            bson::from_document(doc! { "_id": null, "averagePrice": null }).unwrap();
        assert_eq!(no_prices.genre, None);
        assert_eq!(no_prices.average_price, None);

        let decade: DecadeBookCount =
            bson::from_document(doc! { "_id": 1980, "totalBooks": 2 }).unwrap();
        assert_eq!(decade.decade, Some(1980));
        assert_eq!(decade.total_books, 2);

        let author: AuthorBookCount =
            bson::from_document(doc! { "_id": "George Orwell", "totalBooks": 2_i64 }).unwrap();
        assert_eq!(author.total_books, 2);
    }
}
