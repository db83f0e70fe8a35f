//! Loan lifecycle and availability counter tests

mod common;

use chrono::{Duration, Utc};

use biblioteca_server::{
    error::AppError,
    models::book::UpdateBook,
    models::loan::{CreateLoan, Loan, LoanStatus},
};

use common::{claims_for, create_book, create_librarian, create_student, test_services};

#[tokio::test]
async fn student_request_approval_and_return_flow() {
    let services = test_services();
    let student = create_student(&services, "student").await;
    let book = create_book(&services, "Dom Casmurro", 1, 1).await;

    // Student requests a loan for themselves: pending, copy reserved
    let loan = services
        .loans
        .create_loan(
            &claims_for(&student),
            CreateLoan {
                user_id: student.id,
                book_id: book.id,
            },
        )
        .await
        .unwrap();
    assert_eq!(loan.status, LoanStatus::Pending);
    assert!(loan.returned_date.is_none());
    assert_eq!(
        services.catalog.get_book(book.id).await.unwrap().available_copies,
        0
    );

    // Librarian approves: status changes, counter untouched
    let approved = services.loans.approve_loan(loan.id).await.unwrap();
    assert_eq!(approved.status, LoanStatus::Approved);
    assert_eq!(
        services.catalog.get_book(book.id).await.unwrap().available_copies,
        0
    );

    // Librarian returns: terminal state, copy handed back
    let returned = services.loans.return_loan(loan.id).await.unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert!(returned.returned_date.is_some());
    assert_eq!(
        services.catalog.get_book(book.id).await.unwrap().available_copies,
        1
    );
}

#[tokio::test]
async fn librarian_created_loan_starts_approved() {
    let services = test_services();
    let librarian = create_librarian(&services, "librarian").await;
    let student = create_student(&services, "student").await;
    let book = create_book(&services, "1984", 2, 2).await;

    let loan = services
        .loans
        .create_loan(
            &claims_for(&librarian),
            CreateLoan {
                user_id: student.id,
                book_id: book.id,
            },
        )
        .await
        .unwrap();

    assert_eq!(loan.status, LoanStatus::Approved);
    assert_eq!(
        services.catalog.get_book(book.id).await.unwrap().available_copies,
        1
    );
}

#[tokio::test]
async fn unavailable_book_is_rejected_without_state_change() {
    let services = test_services();
    let student = create_student(&services, "student").await;
    let book = create_book(&services, "Orgulho e Preconceito", 2, 0).await;

    let err = services
        .loans
        .create_loan(
            &claims_for(&student),
            CreateLoan {
                user_id: student.id,
                book_id: book.id,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Unavailable(_)));
    assert_eq!(
        services.catalog.get_book(book.id).await.unwrap().available_copies,
        0
    );
    assert!(services.loans.list_all().await.is_empty());
}

#[tokio::test]
async fn loan_against_missing_book_is_not_found() {
    let services = test_services();
    let student = create_student(&services, "student").await;

    let err = services
        .loans
        .create_loan(
            &claims_for(&student),
            CreateLoan {
                user_id: student.id,
                book_id: 9999,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn student_cannot_borrow_for_another_user() {
    let services = test_services();
    let student_a = create_student(&services, "alice").await;
    let student_b = create_student(&services, "bob").await;
    let book = create_book(&services, "Cem Anos de Solidão", 3, 3).await;

    let err = services
        .loans
        .create_loan(
            &claims_for(&student_a),
            CreateLoan {
                user_id: student_b.id,
                book_id: book.id,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Authorization(_)));
    assert_eq!(
        services.catalog.get_book(book.id).await.unwrap().available_copies,
        3
    );
}

#[tokio::test]
async fn approving_non_pending_loan_fails() {
    let services = test_services();
    let librarian = create_librarian(&services, "librarian").await;
    let student = create_student(&services, "student").await;
    let book = create_book(&services, "A Revolução dos Bichos", 1, 1).await;

    // Librarian-created loans are already approved
    let loan = services
        .loans
        .create_loan(
            &claims_for(&librarian),
            CreateLoan {
                user_id: student.id,
                book_id: book.id,
            },
        )
        .await
        .unwrap();

    let err = services.loans.approve_loan(loan.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    // State unchanged
    let details: Vec<_> = services.loans.list_all().await;
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].status, LoanStatus::Approved);
}

#[tokio::test]
async fn second_return_fails_and_counter_increments_once() {
    let services = test_services();
    let librarian = create_librarian(&services, "librarian").await;
    let student = create_student(&services, "student").await;
    let book = create_book(&services, "Memórias Póstumas", 4, 4).await;

    let loan = services
        .loans
        .create_loan(
            &claims_for(&librarian),
            CreateLoan {
                user_id: student.id,
                book_id: book.id,
            },
        )
        .await
        .unwrap();
    assert_eq!(
        services.catalog.get_book(book.id).await.unwrap().available_copies,
        3
    );

    services.loans.return_loan(loan.id).await.unwrap();
    let err = services.loans.return_loan(loan.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    // Incremented exactly once, still within bounds
    let book = services.catalog.get_book(book.id).await.unwrap();
    assert_eq!(book.available_copies, 4);
    assert!(book.available_copies <= book.total_copies);
}

#[tokio::test]
async fn overdue_is_derived_from_status_and_due_date() {
    let now = Utc::now();
    let mut loan = Loan {
        id: 1,
        user_id: 1,
        book_id: 1,
        loan_date: now - Duration::days(40),
        due_date: now - Duration::days(10),
        returned_date: None,
        status: LoanStatus::Approved,
    };

    assert!(loan.is_overdue(now));

    // Pending loans are never overdue
    loan.status = LoanStatus::Pending;
    assert!(!loan.is_overdue(now));

    // Returned loans are never overdue, whatever the dates
    loan.status = LoanStatus::Returned;
    loan.returned_date = Some(now);
    assert!(!loan.is_overdue(now));

    // An approved loan within its period is not overdue
    loan.status = LoanStatus::Approved;
    loan.returned_date = None;
    loan.due_date = now + Duration::days(10);
    assert!(!loan.is_overdue(now));
}

#[tokio::test]
async fn overdue_flag_appears_in_loan_listings() {
    let services = test_services();
    let librarian = create_librarian(&services, "librarian").await;
    let student = create_student(&services, "student").await;
    let book = create_book(&services, "Ficções", 1, 1).await;

    services
        .loans
        .create_loan(
            &claims_for(&librarian),
            CreateLoan {
                user_id: student.id,
                book_id: book.id,
            },
        )
        .await
        .unwrap();

    // Freshly created with a 30-day period, so not overdue
    let details = services.loans.list_for_user(student.id).await;
    assert_eq!(details.len(), 1);
    assert!(!details[0].is_overdue);
}

#[tokio::test]
async fn active_listing_excludes_returned_loans() {
    let services = test_services();
    let librarian = create_librarian(&services, "librarian").await;
    let student = create_student(&services, "student").await;
    let book = create_book(&services, "O Alienista", 2, 2).await;

    let first = services
        .loans
        .create_loan(
            &claims_for(&librarian),
            CreateLoan {
                user_id: student.id,
                book_id: book.id,
            },
        )
        .await
        .unwrap();
    let second = services
        .loans
        .create_loan(
            &claims_for(&student),
            CreateLoan {
                user_id: student.id,
                book_id: book.id,
            },
        )
        .await
        .unwrap();

    services.loans.return_loan(first.id).await.unwrap();

    let active = services.loans.list_active().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second.id);
    assert_eq!(active[0].status, LoanStatus::Pending);
}

#[tokio::test]
async fn availability_bounds_enforced_on_book_update() {
    let services = test_services();
    let book = create_book(&services, "Bounded", 3, 3).await;

    let err = services
        .catalog
        .update_book(
            book.id,
            UpdateBook {
                title: None,
                author: None,
                category: None,
                description: None,
                publication_year: None,
                total_copies: None,
                available_copies: Some(5),
                cover: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = services
        .catalog
        .update_book(
            book.id,
            UpdateBook {
                title: None,
                author: None,
                category: None,
                description: None,
                publication_year: None,
                total_copies: None,
                available_copies: Some(-1),
                cover: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Unchanged after the rejected updates
    assert_eq!(
        services.catalog.get_book(book.id).await.unwrap().available_copies,
        3
    );
}

#[tokio::test]
async fn returning_loan_for_deleted_book_still_succeeds() {
    let services = test_services();
    let librarian = create_librarian(&services, "librarian").await;
    let student = create_student(&services, "student").await;
    let book = create_book(&services, "Ephemeral", 1, 1).await;

    let loan = services
        .loans
        .create_loan(
            &claims_for(&librarian),
            CreateLoan {
                user_id: student.id,
                book_id: book.id,
            },
        )
        .await
        .unwrap();

    // Deletion does not cascade to the loan
    services.catalog.delete_book(book.id).await.unwrap();

    let returned = services.loans.return_loan(loan.id).await.unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert!(returned.returned_date.is_some());
}
