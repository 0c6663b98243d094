mod readiness_tests;
