//! `mockall` doubles for ports whose call expectations matter more than
//! their recorded state.

use compose_update_cli::application::ports::Notifier;
use compose_update_cli::domain::Notice;
use mockall::mock;

mock! {
    pub Notifier {}

    impl Notifier for Notifier {
        fn deliver(&self, notice: &Notice);
    }
}
