pub mod u501_resolve_part_status;
