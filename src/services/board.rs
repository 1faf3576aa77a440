use crate::models::{Review, ReviewStatus, Severity};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardCard {
    pub id: Uuid,
    pub marketplace: String,
    pub title: String,
    pub severity: Severity,
    pub category: String,
}

impl From<&Review> for BoardCard {
    fn from(review: &Review) -> Self {
        // Emails and some marketplaces carry no title
        let title = if review.title.trim().is_empty() {
            review.content.chars().take(80).collect()
        } else {
            review.title.clone()
        };

        Self {
            id: review.id,
            marketplace: review.marketplace.clone(),
            title,
            severity: review.severity,
            category: review.category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardColumn {
    pub id: ReviewStatus,
    pub title: &'static str,
    pub cards: Vec<BoardCard>,
}

/// Workflow columns in fixed order: open, in progress, resolved.
pub fn build_board(reviews: &[Review]) -> Vec<BoardColumn> {
    ReviewStatus::ALL
        .iter()
        .map(|status| BoardColumn {
            id: *status,
            title: status.title(),
            cards: reviews
                .iter()
                .filter(|review| review.status == *status)
                .map(BoardCard::from)
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_ordered_and_grouped() {
        let reviews = vec![
            Review {
                status: ReviewStatus::Resolved,
                title: "Late".into(),
                ..Default::default()
            },
            Review {
                status: ReviewStatus::Open,
                content: "No title here".into(),
                ..Default::default()
            },
        ];

        let board = build_board(&reviews);
        let ids: Vec<_> = board.iter().map(|c| c.id).collect();
        assert_eq!(
            ids,
            vec![ReviewStatus::Open, ReviewStatus::InProgress, ReviewStatus::Resolved]
        );
        assert_eq!(board[0].cards[0].title, "No title here");
        assert!(board[1].cards.is_empty());
        assert_eq!(board[2].cards[0].title, "Late");
        assert_eq!(board[1].title, "In Progress");
    }
}
