pub mod supabase;

pub use supabase::SupabaseCallSummaryStore;
