//! The restaurant's opening menu.

use crate::MenuItem;

const SEED: &[(&str, &str, u64)] = &[
    // Burgers & sandwiches
    ("1", "Classic Beef Burger", 65000),
    ("2", "Double Cheese Burger", 85000),
    ("3", "Spicy Chicken Burger", 60000),
    ("4", "Fish Fillet Sandwich", 55000),
    // Rice & noodles
    ("5", "Hainanese Chicken Rice", 50000),
    ("6", "Beef Noodle Soup", 55000),
    ("7", "Grilled Pork Vermicelli", 60000),
    ("8", "Vegetarian Fried Rice", 45000),
    // Sides & snacks
    ("9", "French Fries", 25000),
    ("10", "Onion Rings", 30000),
    ("11", "Chicken Nuggets (6pcs)", 40000),
    ("12", "Coleslaw", 15000),
    // Drinks
    ("13", "Coke", 15000),
    ("14", "Diet Coke", 15000),
    ("15", "Sprite", 15000),
    ("16", "Iced Coffee", 25000),
    ("17", "Peach Tea", 30000),
    ("18", "Mineral Water", 10000),
    // Desserts
    ("19", "Vanilla Ice Cream", 15000),
    ("20", "Chocolate Sundae", 25000),
    ("21", "Apple Pie", 20000),
];

/// The seed menu, ids "1" through "21".
pub fn seed_items() -> Vec<MenuItem> {
    SEED.iter()
        .map(|&(id, name, price)| MenuItem::new(id, name, price))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_unique() {
        let items = seed_items();
        let ids: HashSet<_> = items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids.len(), items.len());
        assert_eq!(items.len(), 21);
    }
}
