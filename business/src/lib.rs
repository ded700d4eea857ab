pub mod application {
    pub mod cart {
        pub mod add_to_cart;
        pub mod config;
        pub mod decrement;
        pub mod get_cart;
        pub mod increment;
        pub mod provider;
        pub mod write_queue;
    }
}

pub mod domain {
    pub mod errors;
    pub mod logger;
    pub mod storage;
    pub mod cart {
        pub mod codec;
        pub mod errors;
        pub mod model;
        pub mod use_cases {
            pub mod add_to_cart;
            pub mod decrement;
            pub mod get_cart;
            pub mod increment;
        }
    }
}
