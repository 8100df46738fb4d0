//! Static product-category taxonomy.
//!
//! Twelve categories with six subcategories each, in display order.
//! Loaded once, never mutated.

/// Number of subcategories every category carries.
pub const SUBCATEGORY_COUNT: usize = 6;

/// One top-level category and its ordered subcategories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub subcategories: [&'static str; SUBCATEGORY_COUNT],
}

const CATEGORIES: [Category; 12] = [
    Category {
        name: "Dairy & Eggs",
        subcategories: ["Milk", "Cheese", "Yogurt", "Butter", "Eggs", "Cream"],
    },
    Category {
        name: "Fruits & Vegetables",
        subcategories: [
            "Fresh Fruits",
            "Fresh Vegetables",
            "Salads",
            "Herbs",
            "Organic",
            "Exotic",
        ],
    },
    Category {
        name: "Bakery",
        subcategories: ["Bread", "Pastries", "Cakes", "Cookies", "Donuts", "Bagels"],
    },
    Category {
        name: "Meat & Seafood",
        subcategories: ["Chicken", "Beef", "Pork", "Fish", "Shrimp", "Lobster"],
    },
    Category {
        name: "Frozen Foods",
        subcategories: [
            "Ice Cream",
            "Frozen Meals",
            "Frozen Vegetables",
            "Pizza",
            "Desserts",
            "Appetizers",
        ],
    },
    Category {
        name: "Beverages",
        subcategories: ["Water", "Juice", "Soda", "Coffee", "Tea", "Energy Drinks"],
    },
    Category {
        name: "Snacks & Sweets",
        subcategories: ["Chips", "Candy", "Chocolate", "Nuts", "Popcorn", "Crackers"],
    },
    Category {
        name: "Cereals & Breakfast",
        subcategories: [
            "Cereal",
            "Oatmeal",
            "Granola",
            "Pancake Mix",
            "Syrup",
            "Breakfast Bars",
        ],
    },
    Category {
        name: "Pasta & Rice",
        subcategories: ["Pasta", "Rice", "Noodles", "Couscous", "Quinoa", "Sauces"],
    },
    Category {
        name: "Canned Goods",
        subcategories: ["Soups", "Beans", "Tomatoes", "Vegetables", "Fruits", "Tuna"],
    },
    Category {
        name: "Spices & Condiments",
        subcategories: [
            "Salt & Pepper",
            "Herbs",
            "Sauces",
            "Oil & Vinegar",
            "Ketchup & Mustard",
            "Hot Sauce",
        ],
    },
    Category {
        name: "Household & Cleaning",
        subcategories: [
            "Detergent",
            "Paper Products",
            "Trash Bags",
            "Cleaning Supplies",
            "Air Fresheners",
            "Dish Soap",
        ],
    },
];

/// Read-only view over the taxonomy.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    categories: &'static [Category],
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            categories: &CATEGORIES,
        }
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All categories in display order.
    pub fn categories(&self) -> &'static [Category] {
        self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Find a category by exact name. `None` is a lookup miss, not an error.
    pub fn lookup(&self, name: &str) -> Option<&'static Category> {
        self.categories().iter().find(|c| c.name == name)
    }

    /// Generate s-expression listing category names.
    pub fn names_sexp(&self) -> String {
        let names: Vec<String> = self
            .categories()
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect();
        format!("({})", names.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_twelve_categories_in_order() {
        let catalog = Catalog::new();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.categories()[0].name, "Dairy & Eggs");
        assert_eq!(catalog.categories()[11].name, "Household & Cleaning");
    }

    #[test]
    fn test_names_distinct_and_non_empty() {
        let catalog = Catalog::new();
        let names: HashSet<&str> = catalog.categories().iter().map(|c| c.name).collect();
        assert_eq!(names.len(), catalog.len());
        for category in catalog.categories() {
            assert!(!category.name.is_empty());
            assert!(category.subcategories.iter().all(|s| !s.is_empty()));
        }
    }

    #[test]
    fn test_lookup_hit() {
        let catalog = Catalog::new();
        let bakery = catalog.lookup("Bakery").unwrap();
        assert_eq!(bakery.subcategories[0], "Bread");
        assert_eq!(bakery.subcategories[5], "Bagels");
    }

    #[test]
    fn test_lookup_miss() {
        let catalog = Catalog::new();
        assert!(catalog.lookup("NonexistentCategory").is_none());
        assert!(catalog.lookup("bakery").is_none());
    }

    #[test]
    fn test_names_sexp() {
        let sexp = Catalog::new().names_sexp();
        assert!(sexp.starts_with("(\"Dairy & Eggs\""));
        assert!(sexp.ends_with("\"Household & Cleaning\")"));
    }
}
