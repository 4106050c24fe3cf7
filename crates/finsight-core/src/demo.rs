//! Bundled sample statement
//!
//! Three months of a typical household card/ACH statement, used by the demo
//! command and the `/api/demo` endpoint.

/// Sample expense CSV (header plus 28 rows, Nov 2023 to Jan 2024)
pub const DEMO_CSV: &str = "Date,Description,Amount,Payment Method
2023-11-01,Starbucks,5.50,Credit Card
2023-11-01,Netflix,15.99,Direct Debit
2023-11-02,Rent - Apt 4B,1200.00,ACH
2023-11-03,Exxon Mobile,45.00,Credit Card
2023-11-05,Whole Foods,89.30,Credit Card
2023-11-07,Gym Membership,50.00,Credit Card
2023-11-10,Uber,22.40,Credit Card
2023-11-15,Amazon - Household,45.90,Credit Card
2023-11-18,Dinner - Italian Bistro,75.00,Debit Card
2023-11-20,City Utilities,112.00,ACH
2023-12-01,Starbucks,6.20,Credit Card
2023-12-01,Netflix,15.99,Direct Debit
2023-12-02,Rent - Apt 4B,1200.00,ACH
2023-12-04,Shell Gas,52.00,Credit Card
2023-12-06,Trader Joes,104.50,Credit Card
2023-12-10,Uber,18.90,Credit Card
2023-12-12,Spotify,9.99,Debit Card
2023-12-20,City Utilities,135.00,ACH
2023-12-22,Christmas Shopping - Mall,340.00,Credit Card
2024-01-01,Starbucks,4.50,Credit Card
2024-01-02,Rent - Apt 4B,1200.00,ACH
2024-01-05,Whole Foods,92.00,Credit Card
2024-01-07,Gym Membership,50.00,Credit Card
2024-01-10,Uber,25.00,Credit Card
2024-01-15,iPhone Installment,42.00,Credit Card
2024-01-18,Restaurant - Sushi,110.00,Debit Card
2024-01-22,City Utilities,108.00,ACH
2024-01-25,LinkedIn Premium,29.99,Credit Card";
