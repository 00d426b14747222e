pub mod cdp_parser;
