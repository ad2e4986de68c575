//! Bilingual user-facing notices.
//!
//! The fixed table the admin surfaces show around mutations. Vietnamese
//! first, English second, selected by the stored locale preference.

use crate::domain::types::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    CreateSuccess,
    CreateFailed,
    UpdateSuccess,
    UpdateFailed,
    DeleteSuccess,
    DeleteFailed,
    NoChanges,
    OrderUpdateFailed,
    LoginSuccess,
    LoginFailed,
    NotOwner,
    SelfEditOnly,
    NotSignedIn,
}

impl Notice {
    pub fn text(self, locale: Locale) -> &'static str {
        use Locale::{En, Vi};
        match (self, locale) {
            (Self::CreateSuccess, Vi) => "Tạo thành công!",
            (Self::CreateSuccess, En) => "Created successfully!",
            (Self::CreateFailed, Vi) => "Tạo thất bại!",
            (Self::CreateFailed, En) => "Create failed!",
            (Self::UpdateSuccess, Vi) => "Cập nhật thành công!",
            (Self::UpdateSuccess, En) => "Update success!",
            (Self::UpdateFailed, Vi) => "Cập nhật thất bại",
            (Self::UpdateFailed, En) => "Update failed",
            (Self::DeleteSuccess, Vi) => "Xóa thành công!",
            (Self::DeleteSuccess, En) => "Deleted successfully!",
            (Self::DeleteFailed, Vi) => "Xóa thất bại",
            (Self::DeleteFailed, En) => "Delete failed",
            (Self::NoChanges, Vi) => "Không có thay đổi nào",
            (Self::NoChanges, En) => "No changes",
            (Self::OrderUpdateFailed, Vi) => "Cập nhật thứ tự thất bại",
            (Self::OrderUpdateFailed, En) => "Update order failed",
            (Self::LoginSuccess, Vi) => "Đăng nhập thành công!",
            (Self::LoginSuccess, En) => "Login success!",
            (Self::LoginFailed, Vi) => "Đăng nhập thất bại",
            (Self::LoginFailed, En) => "Login failed",
            (Self::NotOwner, Vi) => "Bạn chỉ có thể chỉnh sửa bản ghi do mình tạo!",
            (Self::NotOwner, En) => "You can only modify records you created!",
            (Self::SelfEditOnly, Vi) => "Bạn chỉ có thể chỉnh sửa tài khoản của chính mình!",
            (Self::SelfEditOnly, En) => "You can only edit your own account!",
            (Self::NotSignedIn, Vi) => "Vui lòng đăng nhập trước",
            (Self::NotSignedIn, En) => "Please sign in first",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_follow_the_locale() {
        assert_eq!(
            Notice::NoChanges.text(Locale::Vi),
            "Không có thay đổi nào"
        );
        assert_eq!(Notice::NoChanges.text(Locale::En), "No changes");
        assert_eq!(
            Notice::OrderUpdateFailed.text(Locale::Vi),
            "Cập nhật thứ tự thất bại"
        );
    }
}
